// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scan reconciler.
//!
//! Turns one raw scan payload into at most one attendance command:
//!
//! | Service status | Action                                        |
//! |----------------|-----------------------------------------------|
//! | `NotFound`     | check in                                      |
//! | `CheckedIn`    | check out                                     |
//! | `CheckedOut`   | ask "check in again?"; check in if confirmed  |
//!
//! Admission is synchronous and happens before the first suspension
//! point, so of two scans arriving in the same tick exactly one passes
//! the gate. Resolution may then await the network and the operator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rollcall_config::model::ScannerConfig;
use rollcall_core::{
    AccessToken, Action, AttendanceService, Confirmation, Confirmer, CredentialProvider, Identity,
    RecordStatus, RollcallError, ScanEvent, ScanFeedback, StatusLookup,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::gate::{DebounceGate, GateRejection, GateState};

/// Tunables of a reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    pub debounce: Duration,
    pub hold_lock_during_confirmation: bool,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2000),
            hold_lock_during_confirmation: false,
        }
    }
}

impl From<&ScannerConfig> for ReconcilerSettings {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            hold_lock_during_confirmation: config.hold_lock_during_confirmation,
        }
    }
}

/// Final result of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Dropped by the gate; nothing happened.
    Ignored(GateRejection),
    /// The command was accepted by the service.
    Completed(Action),
    /// The operator declined to check an already checked-out identity in again.
    Cancelled,
}

/// Proof that a scan passed the gate. Only [`ScanReconciler::admit`] creates one.
#[derive(Debug)]
pub struct Admission {
    event: ScanEvent,
}

impl Admission {
    pub fn event(&self) -> &ScanEvent {
        &self.event
    }
}

/// Converts scans into attendance commands for one scanning session.
///
/// The debounce state is an owned field: it lives exactly as long as the
/// reconciler, which is created when the session starts and dropped when
/// it ends.
pub struct ScanReconciler {
    gate: Mutex<DebounceGate>,
    service: Arc<dyn AttendanceService>,
    credentials: Arc<dyn CredentialProvider>,
    confirmer: Arc<dyn Confirmer>,
    feedback: Arc<dyn ScanFeedback>,
}

impl ScanReconciler {
    pub fn new(
        settings: ReconcilerSettings,
        service: Arc<dyn AttendanceService>,
        credentials: Arc<dyn CredentialProvider>,
        confirmer: Arc<dyn Confirmer>,
        feedback: Arc<dyn ScanFeedback>,
    ) -> Self {
        Self {
            gate: Mutex::new(DebounceGate::new(
                settings.debounce,
                settings.hold_lock_during_confirmation,
            )),
            service,
            credentials,
            confirmer,
            feedback,
        }
    }

    /// The feedback sink this reconciler reports to.
    pub fn feedback(&self) -> &Arc<dyn ScanFeedback> {
        &self.feedback
    }

    /// Confirmations currently awaiting an operator answer.
    pub fn pending_confirmations(&self) -> usize {
        self.lock_gate().pending_confirmations()
    }

    /// Current gate state, for status displays.
    pub fn gate_state(&self, now: Instant) -> GateState {
        self.lock_gate().state(now)
    }

    /// Gate a scan. Never suspends.
    pub fn admit(&self, event: ScanEvent) -> Result<Admission, GateRejection> {
        match self.lock_gate().try_admit(event.observed_at) {
            Ok(()) => {
                debug!(payload_len = event.raw_payload.len(), "scan accepted");
                Ok(Admission { event })
            }
            Err(rejection) => {
                debug!(%rejection, "scan ignored");
                Err(rejection)
            }
        }
    }

    /// Gate and resolve a scan in one call.
    ///
    /// Errors are returned, not surfaced; the caller decides how to show them.
    pub async fn handle_scan(
        &self,
        raw_payload: &str,
        now: Instant,
    ) -> Result<ScanOutcome, RollcallError> {
        match self.admit(ScanEvent::new(raw_payload, now)) {
            Ok(admission) => self.resolve(admission).await,
            Err(rejection) => Ok(ScanOutcome::Ignored(rejection)),
        }
    }

    /// Resolve an admitted scan to exactly one command, a cancellation, or an error.
    pub async fn resolve(&self, admission: Admission) -> Result<ScanOutcome, RollcallError> {
        let identity = Identity::parse(&admission.event.raw_payload).inspect_err(|_| {
            debug!("empty scan payload dropped");
        })?;

        // "Scan was read", not "action succeeded".
        self.feedback.acknowledge(&identity).await;

        let Some(token) = self.credentials.access_token().await else {
            warn!(identity = %identity, "no access token, scan not forwarded");
            return Err(RollcallError::NoCredential);
        };

        let lookup = self.service.lookup_status(&identity, &token).await?;
        info!(identity = %identity, status = %lookup.status(), "attendance status resolved");

        let action = match lookup {
            StatusLookup::NotFound => Action::CheckIn(identity),
            StatusLookup::Found(RecordStatus::CheckedIn) => Action::CheckOut(identity),
            StatusLookup::Found(RecordStatus::CheckedOut) => {
                match self.confirm_recheckin(&identity).await {
                    Confirmation::Confirmed => Action::CheckIn(identity),
                    Confirmation::Cancelled => {
                        info!(identity = %identity, "re-check-in cancelled by operator");
                        return Ok(ScanOutcome::Cancelled);
                    }
                }
            }
        };

        self.forward(action, &token).await
    }

    async fn confirm_recheckin(&self, identity: &Identity) -> Confirmation {
        let _hold = ConfirmationHold::new(&self.gate);
        self.confirmer.confirm_recheckin(identity).await
    }

    /// Send the command; either way the surface goes back to the roster.
    async fn forward(
        &self,
        action: Action,
        token: &AccessToken,
    ) -> Result<ScanOutcome, RollcallError> {
        let result = match &action {
            Action::CheckIn(identity) => self.service.check_in(identity, token).await,
            Action::CheckOut(identity) => self.service.check_out(identity, token).await,
        };

        match result {
            Ok(()) => {
                info!(identity = %action.identity(), action = action.verb(), "attendance updated");
                self.feedback.completed(&action).await;
                self.feedback.return_to_roster().await;
                Ok(ScanOutcome::Completed(action))
            }
            Err(err) => {
                warn!(identity = %action.identity(), action = action.verb(), error = %err, "attendance command failed");
                self.feedback.return_to_roster().await;
                Err(err)
            }
        }
    }

    fn lock_gate(&self) -> MutexGuard<'_, DebounceGate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a confirmation as pending on the gate for as long as it lives,
/// including when the reconciliation future is dropped mid-prompt.
struct ConfirmationHold<'a> {
    gate: &'a Mutex<DebounceGate>,
}

impl<'a> ConfirmationHold<'a> {
    fn new(gate: &'a Mutex<DebounceGate>) -> Self {
        gate.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .begin_confirmation();
        Self { gate }
    }
}

impl Drop for ConfirmationHold<'_> {
    fn drop(&mut self) {
        self.gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .end_confirmation();
    }
}
