// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end scan testing.
//!
//! `TestHarness` assembles a complete reconciler with mock collaborators
//! and exposes `scan()` to drive a payload through the gate, the status
//! lookup, the decision table and the command.

use std::sync::Arc;
use std::time::Duration;

use rollcall_config::model::{RollcallConfig, ScannerConfig};
use rollcall_core::{Confirmation, Confirmer, RollcallError, StatusLookup};
use rollcall_scanner::{ReconcilerSettings, ScanOutcome, ScanReconciler, ScanStation};
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::debug;

use crate::mock_confirmer::{ManualConfirmer, ManualConfirmerHandle, ScriptedConfirmer};
use crate::mock_credential::MockCredential;
use crate::mock_service::MockAttendanceService;
use crate::recording_feedback::RecordingFeedback;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    service: MockAttendanceService,
    gated_lookups: bool,
    confirmations: Vec<Confirmation>,
    fallback: Option<Confirmation>,
    token: Option<String>,
    scanner: ScannerConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            service: MockAttendanceService::new(),
            gated_lookups: false,
            confirmations: Vec::new(),
            fallback: None,
            token: Some("test-token".to_string()),
            scanner: ScannerConfig::default(),
        }
    }

    /// Script the status the service reports for `name`.
    pub fn with_status(mut self, name: &str, lookup: StatusLookup) -> Self {
        self.service = self.service.with_status(name, lookup);
        self
    }

    pub fn with_lookup_error(mut self, name: &str, message: &str) -> Self {
        self.service = self.service.with_lookup_error(name, message);
        self
    }

    pub fn with_unreachable(mut self, name: &str) -> Self {
        self.service = self.service.with_unreachable(name);
        self
    }

    pub fn with_command_error(mut self, message: &str) -> Self {
        self.service = self.service.with_command_error(message);
        self
    }

    /// Hold status lookups until the test releases them through
    /// [`TestHarness::release_lookups`].
    pub fn with_gated_lookups(mut self) -> Self {
        self.gated_lookups = true;
        self
    }

    /// Answers for re-check-in prompts, in order. Unscripted prompts are cancelled.
    pub fn with_confirmations(mut self, answers: Vec<Confirmation>) -> Self {
        self.confirmations = answers;
        self
    }

    /// Answer every re-check-in prompt with `answer`.
    pub fn always_confirm(mut self, answer: Confirmation) -> Self {
        self.fallback = Some(answer);
        self
    }

    /// No stored access token.
    pub fn signed_out(mut self) -> Self {
        self.token = None;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.scanner.debounce_ms = debounce_ms;
        self
    }

    /// Keep the scan lock engaged while a prompt is open.
    pub fn with_confirmation_hold(mut self, hold: bool) -> Self {
        self.scanner.hold_lock_during_confirmation = hold;
        self
    }

    /// Build with a scripted confirmer.
    pub fn build(self) -> TestHarness {
        let confirmer = Arc::new(match self.fallback {
            Some(answer) if self.confirmations.is_empty() => ScriptedConfirmer::always(answer),
            _ => ScriptedConfirmer::new(self.confirmations.clone()),
        });
        let mut harness = self.assemble(confirmer.clone());
        harness.scripted_confirmer = Some(confirmer);
        harness
    }

    /// Build with a confirmer the test answers by hand.
    pub fn build_manual(self) -> (TestHarness, ManualConfirmerHandle) {
        let (confirmer, handle) = ManualConfirmer::new();
        (self.assemble(Arc::new(confirmer)), handle)
    }

    fn assemble(self, confirmer: Arc<dyn Confirmer>) -> TestHarness {
        let (service, lookup_gate) = if self.gated_lookups {
            let (service, gate) = self.service.with_gated_lookups();
            (service, Some(gate))
        } else {
            (self.service, None)
        };
        let service = Arc::new(service);
        let credentials = Arc::new(match &self.token {
            Some(token) => MockCredential::with_token(token),
            None => MockCredential::signed_out(),
        });
        let feedback = Arc::new(RecordingFeedback::new());

        let config = RollcallConfig {
            scanner: self.scanner,
            ..RollcallConfig::default()
        };
        debug!(
            debounce_ms = config.scanner.debounce_ms,
            hold = config.scanner.hold_lock_during_confirmation,
            "assembling test harness"
        );

        let reconciler = Arc::new(ScanReconciler::new(
            ReconcilerSettings::from(&config.scanner),
            service.clone(),
            credentials.clone(),
            confirmer,
            feedback.clone(),
        ));

        TestHarness {
            reconciler,
            service,
            credentials,
            feedback,
            scripted_confirmer: None,
            lookup_gate,
            config,
        }
    }
}

/// A complete scan environment backed by mocks.
pub struct TestHarness {
    pub reconciler: Arc<ScanReconciler>,
    pub service: Arc<MockAttendanceService>,
    pub credentials: Arc<MockCredential>,
    pub feedback: Arc<RecordingFeedback>,
    /// Present when built with [`TestHarnessBuilder::build`].
    pub scripted_confirmer: Option<Arc<ScriptedConfirmer>>,
    lookup_gate: Option<Arc<Semaphore>>,
    pub config: RollcallConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drive one scan observed at `at`.
    pub async fn scan(&self, raw_payload: &str, at: Instant) -> Result<ScanOutcome, RollcallError> {
        self.reconciler.handle_scan(raw_payload, at).await
    }

    /// A station over this harness's reconciler.
    pub fn station(&self) -> ScanStation {
        ScanStation::new(Arc::clone(&self.reconciler)).with_drain_timeout(Duration::from_secs(1))
    }

    /// Let `n` held status lookups proceed. No-op without gated lookups.
    pub fn release_lookups(&self, n: usize) {
        if let Some(gate) = &self.lookup_gate {
            gate.add_permits(n);
        }
    }

    /// Prompts shown to the scripted confirmer.
    pub fn prompts(&self) -> Vec<String> {
        self.scripted_confirmer
            .as_ref()
            .map(|c| c.prompts())
            .unwrap_or_default()
    }
}
