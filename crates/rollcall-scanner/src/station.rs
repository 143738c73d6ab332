// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scan station loop.
//!
//! Consumes scan events from a channel, admits each one synchronously,
//! and resolves admitted scans on their own tasks so the input keeps
//! flowing while an earlier scan waits on the network or on the operator.

use std::sync::Arc;
use std::time::Duration;

use rollcall_core::{RollcallError, ScanEvent};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::reconciler::{ScanOutcome, ScanReconciler};

/// How long in-flight scans get to finish after shutdown is requested.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Tally of one station run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StationReport {
    pub accepted: usize,
    pub ignored: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub failed: usize,
    /// In-flight scans aborted because the drain timed out.
    pub abandoned: usize,
}

impl StationReport {
    fn record(&mut self, joined: Result<Result<ScanOutcome, RollcallError>, JoinError>) {
        match joined {
            Ok(Ok(ScanOutcome::Completed(_))) => self.completed += 1,
            Ok(Ok(ScanOutcome::Cancelled)) => self.cancelled += 1,
            Ok(Ok(ScanOutcome::Ignored(_))) => self.ignored += 1,
            Ok(Err(_)) => self.failed += 1,
            Err(e) if e.is_cancelled() => self.abandoned += 1,
            Err(e) => {
                error!(error = %e, "scan task panicked");
                self.failed += 1;
            }
        }
    }
}

type ScanTasks = JoinSet<Result<ScanOutcome, RollcallError>>;

pub struct ScanStation {
    reconciler: Arc<ScanReconciler>,
    drain_timeout: Duration,
}

impl ScanStation {
    pub fn new(reconciler: Arc<ScanReconciler>) -> Self {
        Self {
            reconciler,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn reconciler(&self) -> &Arc<ScanReconciler> {
        &self.reconciler
    }

    /// Run until the event channel closes or `cancel` fires.
    ///
    /// A closed channel waits for every in-flight scan until `cancel` fires.
    /// Cancellation waits at most the drain timeout, then aborts what is left.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<ScanEvent>,
        cancel: CancellationToken,
    ) -> StationReport {
        info!("scan station running");
        let mut report = StationReport::default();
        let mut tasks = ScanTasks::new();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(in_flight = tasks.len(), "shutdown signal received, stopping scan station");
                    self.drain_with_timeout(&mut tasks, &mut report).await;
                    break;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    report.record(joined);
                }
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event, &mut tasks, &mut report),
                    None => {
                        debug!(in_flight = tasks.len(), "scan input closed");
                        self.drain_until_cancelled(&mut tasks, &mut report, &cancel).await;
                        break;
                    }
                },
            }
        }

        info!(
            accepted = report.accepted,
            ignored = report.ignored,
            completed = report.completed,
            failed = report.failed,
            "scan station stopped"
        );
        report
    }

    fn dispatch(&self, event: ScanEvent, tasks: &mut ScanTasks, report: &mut StationReport) {
        let admission = match self.reconciler.admit(event) {
            Ok(admission) => admission,
            Err(_) => {
                report.ignored += 1;
                return;
            }
        };
        report.accepted += 1;

        let reconciler = Arc::clone(&self.reconciler);
        tasks.spawn(async move {
            let result = reconciler.resolve(admission).await;
            if let Err(err) = &result
                && !err.is_silent()
            {
                reconciler.feedback().alert(err).await;
            }
            result
        });
    }

    async fn drain_until_cancelled(
        &self,
        tasks: &mut ScanTasks,
        report: &mut StationReport,
        cancel: &CancellationToken,
    ) {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(in_flight = tasks.len(), "shutdown signal received while draining");
                self.drain_with_timeout(tasks, report).await;
            }
            _ = drain(tasks, report) => {}
        }
    }

    async fn drain_with_timeout(&self, tasks: &mut ScanTasks, report: &mut StationReport) {
        if tasks.is_empty() {
            return;
        }
        if tokio::time::timeout(self.drain_timeout, drain(tasks, report))
            .await
            .is_err()
        {
            warn!(
                remaining = tasks.len(),
                timeout_secs = self.drain_timeout.as_secs(),
                "drain timeout reached, abandoning in-flight scans"
            );
            tasks.abort_all();
            drain(tasks, report).await;
        }
    }
}

async fn drain(tasks: &mut ScanTasks, report: &mut StationReport) {
    while let Some(joined) = tasks.join_next().await {
        report.record(joined);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::ReconcilerSettings;
    use rollcall_core::{Confirmation, Confirmer, RecordStatus, StatusLookup};
    use rollcall_test_utils::{
        FeedbackEvent, ManualConfirmer, MockAttendanceService, MockCredential, RecordingFeedback,
        ScriptedConfirmer,
    };
    use tokio::time::Instant;

    fn station(
        service: MockAttendanceService,
        confirmer: Arc<dyn Confirmer>,
        feedback: Arc<RecordingFeedback>,
    ) -> (ScanStation, Arc<MockAttendanceService>) {
        let service = Arc::new(service);
        let reconciler = ScanReconciler::new(
            ReconcilerSettings::default(),
            service.clone(),
            Arc::new(MockCredential::with_token("jwt")),
            confirmer,
            feedback,
        );
        (ScanStation::new(Arc::new(reconciler)), service)
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_drains_and_reports() {
        let feedback = Arc::new(RecordingFeedback::new());
        let (station, service) = station(
            MockAttendanceService::new(),
            Arc::new(ScriptedConfirmer::new(Vec::new())),
            feedback,
        );
        let (tx, rx) = mpsc::channel(8);
        let t0 = Instant::now();
        tx.send(ScanEvent::new("JASPER KOH", t0)).await.unwrap();
        tx.send(ScanEvent::new("JASPER KOH", t0 + Duration::from_millis(100)))
            .await
            .unwrap();
        tx.send(ScanEvent::new("OH CHARMIAN", t0 + Duration::from_millis(2500)))
            .await
            .unwrap();
        drop(tx);

        let report = station.run(rx, CancellationToken::new()).await;

        assert_eq!(report.accepted, 2);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.completed, 2);
        assert_eq!(service.mutations().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn service_errors_are_alerted_invalid_payloads_are_not() {
        let feedback = Arc::new(RecordingFeedback::new());
        let (station, _service) = station(
            MockAttendanceService::new().with_lookup_error("JASPER KOH", "Database busy"),
            Arc::new(ScriptedConfirmer::new(Vec::new())),
            feedback.clone(),
        );
        let (tx, rx) = mpsc::channel(8);
        let t0 = Instant::now();
        tx.send(ScanEvent::new("   ", t0)).await.unwrap();
        tx.send(ScanEvent::new("JASPER KOH", t0 + Duration::from_secs(3)))
            .await
            .unwrap();
        drop(tx);

        let report = station.run(rx, CancellationToken::new()).await;

        assert_eq!(report.failed, 2);
        assert_eq!(feedback.alerts(), vec!["Database busy".to_string()]);
        assert!(feedback.events().contains(&FeedbackEvent::Alert {
            title: "Error".into(),
            message: "Database busy".into(),
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_abandons_unanswered_prompt_after_drain_timeout() {
        let feedback = Arc::new(RecordingFeedback::new());
        let (confirmer, mut handle) = ManualConfirmer::new();
        let (station, service) = station(
            MockAttendanceService::new()
                .with_status("WANG YOU", StatusLookup::Found(RecordStatus::CheckedOut)),
            Arc::new(confirmer),
            feedback,
        );
        let station = station.with_drain_timeout(Duration::from_secs(1));
        let reconciler = Arc::clone(station.reconciler());
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        let run = tokio::spawn({
            let cancel = cancel.clone();
            async move { station.run(rx, cancel).await }
        });
        tx.send(ScanEvent::now("WANG YOU")).await.unwrap();
        assert_eq!(handle.prompt_opened().await.as_deref(), Some("WANG YOU"));
        assert_eq!(reconciler.pending_confirmations(), 1);

        cancel.cancel();
        let report = run.await.unwrap();

        assert_eq!(report.abandoned, 1);
        assert!(service.mutations().is_empty());
        assert_eq!(reconciler.pending_confirmations(), 0);
        // Answering late changes nothing.
        handle.answer(Confirmation::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_drain_after_input_closes() {
        let feedback = Arc::new(RecordingFeedback::new());
        let (confirmer, mut handle) = ManualConfirmer::new();
        let (station, service) = station(
            MockAttendanceService::new()
                .with_status("WANG YOU", StatusLookup::Found(RecordStatus::CheckedOut)),
            Arc::new(confirmer),
            feedback,
        );
        let station = station.with_drain_timeout(Duration::from_millis(200));
        let reconciler = Arc::clone(station.reconciler());
        let (tx, rx) = mpsc::channel(8);
        tx.send(ScanEvent::now("WANG YOU")).await.unwrap();
        drop(tx);
        let cancel = CancellationToken::new();

        let run = tokio::spawn({
            let cancel = cancel.clone();
            async move { station.run(rx, cancel).await }
        });
        // The input is closed and the prompt is left unanswered.
        assert_eq!(handle.prompt_opened().await.as_deref(), Some("WANG YOU"));

        cancel.cancel();
        let report = tokio::time::timeout(Duration::from_secs(3), run)
            .await
            .expect("station stops once cancelled")
            .unwrap();

        assert_eq!(report.accepted, 1);
        assert_eq!(report.abandoned, 1);
        assert!(service.mutations().is_empty());
        assert_eq!(reconciler.pending_confirmations(), 0);
    }
}
