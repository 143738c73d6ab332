// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attendance service client for the Rollcall scan station.
//!
//! [`AttendanceClient`] speaks the backend's JSON API (status lookup,
//! check-in, check-out, roster, parent notification, finish-day, student
//! enrolment) and implements [`AttendanceService`] for the reconciler.

pub mod client;
pub mod credential;
pub mod roster;
pub mod tls;
pub mod types;

use async_trait::async_trait;
use rollcall_core::{AccessToken, AttendanceService, Identity, RollcallError, StatusLookup};

pub use client::AttendanceClient;
pub use credential::StaticCredential;
pub use roster::{filter_enrolled, filter_roster, presence_counts};
pub use types::{EnrolledStudent, NewStudent};

#[async_trait]
impl AttendanceService for AttendanceClient {
    async fn lookup_status(
        &self,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<StatusLookup, RollcallError> {
        self.status(identity, token).await
    }

    async fn check_in(&self, identity: &Identity, token: &AccessToken) -> Result<(), RollcallError> {
        AttendanceClient::check_in(self, identity, token).await
    }

    async fn check_out(&self, identity: &Identity, token: &AccessToken) -> Result<(), RollcallError> {
        AttendanceClient::check_out(self, identity, token).await
    }
}
