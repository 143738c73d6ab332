// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rollcall scan station.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rollcall configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RollcallConfig {
    /// Attendance service endpoint and credential.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Scan reconciliation settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Attendance service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Base URL all endpoint paths are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the service. `None` means no session; every
    /// service call fails with an authentication error.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Total per-request timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Reject plain `http` for non-localhost hosts.
    #[serde(default = "default_require_tls")]
    pub require_tls: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            require_tls: default_require_tls(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/api/db/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_require_tls() -> bool {
    true
}

/// Scan reconciliation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScannerConfig {
    /// Window after an accepted scan during which further scans are ignored.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Keep the scan lock engaged while a re-check-in prompt is unanswered,
    /// even after the debounce window lapses.
    #[serde(default)]
    pub hold_lock_during_confirmation: bool,

    /// Title of the re-check-in prompt.
    #[serde(default = "default_prompt_title")]
    pub prompt_title: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            hold_lock_during_confirmation: false,
            prompt_title: default_prompt_title(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_prompt_title() -> String {
    "Already Checked Out".to_string()
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format for the fmt subscriber.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

impl RollcallConfig {
    /// Copy of the configuration safe to print: the access token is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.service.access_token.is_some() {
            copy.service.access_token = Some("[REDACTED]".to_string());
        }
        copy
    }
}
