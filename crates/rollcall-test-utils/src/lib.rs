// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rollcall integration tests.
//!
//! Provides mock collaborators and a test harness for fast,
//! deterministic, CI-runnable tests without a live attendance service.
//!
//! # Components
//!
//! - [`MockAttendanceService`] - scripted status table with call recording
//! - [`ScriptedConfirmer`] / [`ManualConfirmer`] - stand-ins for the operator
//! - [`RecordingFeedback`] - captures every cue the station emits
//! - [`TestHarness`] - a fully wired reconciler over the mocks

pub mod harness;
pub mod mock_confirmer;
pub mod mock_credential;
pub mod mock_service;
pub mod recording_feedback;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_confirmer::{ManualConfirmer, ManualConfirmerHandle, ScriptedConfirmer};
pub use mock_credential::MockCredential;
pub use mock_service::{MockAttendanceService, ServiceCall};
pub use recording_feedback::{FeedbackEvent, RecordingFeedback};
