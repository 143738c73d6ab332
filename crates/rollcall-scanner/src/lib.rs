// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scan reconciliation for the Rollcall scan station.
//!
//! - [`gate`]: the time-based debounce lock
//! - [`reconciler`]: one scan to at most one check-in or check-out
//! - [`station`]: the loop that feeds scans from an input channel

pub mod gate;
pub mod reconciler;
pub mod station;

pub use gate::{DebounceGate, GateRejection, GateState};
pub use reconciler::{Admission, ReconcilerSettings, ScanOutcome, ScanReconciler};
pub use station::{ScanStation, StationReport, DEFAULT_DRAIN_TIMEOUT};
