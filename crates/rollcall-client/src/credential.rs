// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential providers backed by configuration.

use async_trait::async_trait;
use rollcall_config::model::ServiceConfig;
use rollcall_core::{AccessToken, CredentialProvider};

/// A fixed bearer token, typically `service.access_token` or
/// `ROLLCALL_SERVICE_ACCESS_TOKEN`.
///
/// An empty or missing token means "no session".
#[derive(Clone, Default)]
pub struct StaticCredential {
    token: Option<AccessToken>,
}

impl StaticCredential {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .map(AccessToken::new),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.access_token.clone())
    }

    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("present", &self.is_present())
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn access_token(&self) -> Option<AccessToken> {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_token_counts_as_absent() {
        assert!(StaticCredential::new(Some("   ".into())).access_token().await.is_none());
        assert!(StaticCredential::new(None).access_token().await.is_none());
    }

    #[tokio::test]
    async fn configured_token_is_returned() {
        let config = ServiceConfig {
            access_token: Some("jwt".into()),
            ..ServiceConfig::default()
        };
        let cred = StaticCredential::from_config(&config);
        assert_eq!(cred.access_token().await.unwrap().expose(), "jwt");
        assert_eq!(format!("{cred:?}"), "StaticCredential { present: true }");
    }
}
