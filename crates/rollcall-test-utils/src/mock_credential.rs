// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use rollcall_core::{AccessToken, CredentialProvider};

/// Credential source with a fixed answer that counts how often it is asked.
pub struct MockCredential {
    token: Option<String>,
    requests: AtomicUsize,
}

impl MockCredential {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            requests: AtomicUsize::new(0),
        }
    }

    /// No session: every request yields `None`.
    pub fn signed_out() -> Self {
        Self {
            token: None,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for MockCredential {
    async fn access_token(&self) -> Option<AccessToken> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.token.as_deref().map(AccessToken::new)
    }
}
