// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::types::{Confirmation, Identity};

/// Asks the operator whether an already checked-out identity should be
/// checked in again.
///
/// There is no timeout: the future resolves only when the operator answers.
#[async_trait]
pub trait Confirmer: Send + Sync + 'static {
    async fn confirm_recheckin(&self, identity: &Identity) -> Confirmation;
}

/// Prompt body shown for a re-check-in confirmation.
pub fn recheckin_prompt(identity: &Identity) -> String {
    format!("{identity} is already checked out. Check in again?")
}
