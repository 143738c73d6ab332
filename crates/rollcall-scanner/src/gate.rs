// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time-based scan lock.
//!
//! The gate is a sliding window, not a mutex: once a scan is accepted the
//! gate reports `Locked` until `accepted_at + window`, and the transition
//! back to `Idle` is a predicate evaluated lazily on the next scan. There
//! is no explicit unlock event.
//!
//! Optionally the lock can also be held while a re-check-in confirmation
//! is unanswered, closing the gap where the window lapses under an open
//! prompt and a second scan is reconciled concurrently.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// Observable state of the gate at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Locked { until: Instant },
    /// Window lapsed, but a confirmation is pending and the hold is enabled.
    AwaitingConfirmation,
}

/// Why a scan was not admitted. Ignored scans are dropped silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// Arrived inside the debounce window of the last accepted scan.
    Debounced { elapsed: Duration },
    /// A re-check-in prompt is still open and the lock is held for it.
    AwaitingConfirmation,
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debounced { elapsed } => {
                write!(f, "debounced ({}ms after last accepted scan)", elapsed.as_millis())
            }
            Self::AwaitingConfirmation => f.write_str("awaiting confirmation"),
        }
    }
}

/// Debounce state owned by a single reconciler for one scanning session.
#[derive(Debug)]
pub struct DebounceGate {
    window: Duration,
    hold_during_confirmation: bool,
    last_accepted: Option<Instant>,
    pending_confirmations: usize,
}

impl DebounceGate {
    pub fn new(window: Duration, hold_during_confirmation: bool) -> Self {
        Self {
            window,
            hold_during_confirmation,
            last_accepted: None,
            pending_confirmations: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self, now: Instant) -> GateState {
        if let Some(accepted) = self.last_accepted {
            let until = accepted + self.window;
            if now < until {
                return GateState::Locked { until };
            }
        }
        if self.hold_during_confirmation && self.pending_confirmations > 0 {
            return GateState::AwaitingConfirmation;
        }
        GateState::Idle
    }

    /// Admit a scan observed at `now`, engaging the lock on success.
    ///
    /// The read and the write happen in one call so two scans in the same
    /// tick cannot both pass.
    pub fn try_admit(&mut self, now: Instant) -> Result<(), GateRejection> {
        match self.state(now) {
            GateState::Idle => {
                self.last_accepted = Some(now);
                Ok(())
            }
            GateState::Locked { .. } => {
                let elapsed = self
                    .last_accepted
                    .map(|accepted| now.saturating_duration_since(accepted))
                    .unwrap_or_default();
                Err(GateRejection::Debounced { elapsed })
            }
            GateState::AwaitingConfirmation => Err(GateRejection::AwaitingConfirmation),
        }
    }

    pub fn begin_confirmation(&mut self) {
        self.pending_confirmations += 1;
    }

    pub fn end_confirmation(&mut self) {
        self.pending_confirmations = self.pending_confirmations.saturating_sub(1);
    }

    pub fn pending_confirmations(&self) -> usize {
        self.pending_confirmations
    }
}
