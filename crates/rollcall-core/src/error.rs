// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rollcall scan station.

use thiserror::Error;

/// Text shown to the operator when the attendance service cannot be reached.
pub const NETWORK_FAILURE_MESSAGE: &str = "Unable to reach the attendance service.";

/// The primary error type used across the service traits and the reconciler.
///
/// Every variant is terminal for the scan that produced it: nothing is
/// retried automatically, a fresh scan is required.
#[derive(Debug, Error)]
pub enum RollcallError {
    /// The scanned payload was empty or whitespace-only.
    #[error("invalid scan payload: empty after trimming")]
    InvalidPayload,

    /// No bearer credential is available from the session provider.
    #[error("no access token available, please log in again")]
    NoCredential,

    /// The attendance service answered with an error field or a non-success status.
    #[error("attendance service error: {message}")]
    Service { message: String },

    /// Transport-level failure reaching the attendance service.
    #[error("network failure: {message}")]
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operator input rejected before it reaches the service.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors (invalid base URL, bad header values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RollcallError {
    /// Shorthand for a service error carrying the backend's message.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }

    /// Wraps a transport error.
    pub fn network<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// The text a scanning surface should show for this error.
    ///
    /// Service messages are passed through verbatim; transport failures
    /// collapse to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidPayload => "Unable to process the QR code.".to_string(),
            Self::NoCredential => "No access token found. Please log in again.".to_string(),
            Self::Service { message } => message.clone(),
            Self::Network { .. } => NETWORK_FAILURE_MESSAGE.to_string(),
            Self::InvalidInput(msg) | Self::Config(msg) | Self::Internal(msg) => msg.clone(),
        }
    }

    /// Short title for an alert dialog.
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidPayload => "Invalid QR Code",
            Self::NoCredential => "Authentication Required",
            Self::InvalidInput(_) => "Invalid Input",
            _ => "Error",
        }
    }

    /// Invalid payloads are dropped without disrupting the operator.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::InvalidPayload)
    }
}
