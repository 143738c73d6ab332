// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The contract the reconciler needs from the attendance backend.

use async_trait::async_trait;

use crate::error::RollcallError;
use crate::types::{AccessToken, Identity, StatusLookup};

/// Backend that owns attendance records.
///
/// Implementations validate response shapes before returning; a backend
/// `error` field becomes [`RollcallError::Service`] and transport problems
/// become [`RollcallError::Network`]. Nothing is retried.
#[async_trait]
pub trait AttendanceService: Send + Sync + 'static {
    /// Resolves the current attendance status of `identity`.
    async fn lookup_status(
        &self,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<StatusLookup, RollcallError>;

    /// Records a check-in for `identity`.
    async fn check_in(&self, identity: &Identity, token: &AccessToken)
    -> Result<(), RollcallError>;

    /// Records a check-out for `identity`.
    async fn check_out(
        &self,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<(), RollcallError>;
}
