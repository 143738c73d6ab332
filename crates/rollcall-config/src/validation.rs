// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::RollcallConfig;

/// Upper bound for the debounce window.
pub const MAX_DEBOUNCE_MS: u64 = 60_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &RollcallConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.service.base_url.trim();
    match url::Url::parse(base_url) {
        Ok(parsed) if !matches!(parsed.scheme(), "http" | "https") => {
            errors.push(ConfigError::Validation {
                message: format!(
                    "service.base_url must use http or https, got scheme `{}`",
                    parsed.scheme()
                ),
            });
        }
        Ok(parsed) if parsed.cannot_be_a_base() || parsed.host_str().is_none() => {
            errors.push(ConfigError::Validation {
                message: format!("service.base_url `{base_url}` has no host"),
            });
        }
        Ok(_) => {}
        Err(e) => errors.push(ConfigError::Validation {
            message: format!("service.base_url `{base_url}` is not a valid URL: {e}"),
        }),
    }

    if config.service.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "service.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    if let Some(token) = &config.service.access_token
        && token.chars().any(char::is_whitespace)
    {
        errors.push(ConfigError::Validation {
            message: "service.access_token must not contain whitespace".to_string(),
        });
    }

    let debounce = config.scanner.debounce_ms;
    if debounce == 0 || debounce > MAX_DEBOUNCE_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "scanner.debounce_ms must be between 1 and {MAX_DEBOUNCE_MS}, got {debounce}"
            ),
        });
    }

    if config.scanner.prompt_title.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "scanner.prompt_title must not be empty".to_string(),
        });
    }

    let level = config.logging.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.log_level `{}` is not one of {}",
                config.logging.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
