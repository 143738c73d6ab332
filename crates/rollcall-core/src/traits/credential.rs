// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use crate::types::AccessToken;

/// Source of the bearer credential for attendance service calls.
///
/// `None` means the operator has no valid session; callers must not reach
/// the service and report [`RollcallError::NoCredential`](crate::RollcallError::NoCredential).
#[async_trait]
pub trait CredentialProvider: Send + Sync + 'static {
    async fn access_token(&self) -> Option<AccessToken>;
}
