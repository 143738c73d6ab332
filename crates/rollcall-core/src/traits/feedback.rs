// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ephemeral operator feedback produced by the reconciler.

use async_trait::async_trait;

use crate::error::RollcallError;
use crate::types::{Action, Identity};

/// Presentation layer hooks.
///
/// Every method is fire-and-forget from the reconciler's point of view.
#[async_trait]
pub trait ScanFeedback: Send + Sync + 'static {
    /// "Scan was read" cue (sound, haptic, check mark). Emitted optimistically
    /// before the backend has answered.
    async fn acknowledge(&self, identity: &Identity);

    /// A check-in or check-out command was accepted by the service.
    async fn completed(&self, action: &Action);

    /// A visible error for the operator.
    async fn alert(&self, error: &RollcallError);

    /// Navigate back to the roster view after a forwarded command.
    async fn return_to_roster(&self);
}
