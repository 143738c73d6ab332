// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Rollcall configuration system.

use rollcall_config::diagnostic::ConfigError;
use rollcall_config::model::LogFormat;
use rollcall_config::{load_and_validate, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_rollcall_config() {
    let toml = r#"
[service]
base_url = "https://attendance.example.com/api/db/"
access_token = "eyJhbGciOiJIUzI1NiJ9"
request_timeout_secs = 5
require_tls = true

[scanner]
debounce_ms = 2500
hold_lock_during_confirmation = true
prompt_title = "Already Out"

[logging]
log_level = "debug"
log_format = "compact"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(
        config.service.base_url,
        "https://attendance.example.com/api/db/"
    );
    assert_eq!(
        config.service.access_token.as_deref(),
        Some("eyJhbGciOiJIUzI1NiJ9")
    );
    assert_eq!(config.service.request_timeout_secs, 5);
    assert!(config.service.require_tls);
    assert_eq!(config.scanner.debounce_ms, 2500);
    assert!(config.scanner.hold_lock_during_confirmation);
    assert_eq!(config.scanner.prompt_title, "Already Out");
    assert_eq!(config.logging.log_level, "debug");
    assert_eq!(config.logging.log_format, LogFormat::Compact);
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should validate");
    assert_eq!(config.scanner.debounce_ms, 2000);
    assert!(!config.scanner.hold_lock_during_confirmation);
    assert_eq!(config.service.request_timeout_secs, 15);
}

/// Unknown key in [scanner] becomes an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_in_scanner_suggests_correction() {
    let toml = r#"
[scanner]
debounse_ms = 100
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "debounse_ms");
            assert_eq!(suggestion.as_deref(), Some("debounce_ms"));
            assert!(span.is_some(), "inline source should yield a span");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[scaner]
debounce_ms = 100
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown section");
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "scaner"));
}

/// A string where a number is expected produces InvalidType.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[scanner]
debounce_ms = "two seconds"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    assert!(
        matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("debounce_ms")),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_through_loader() {
    let toml = r#"
[service]
base_url = "ftp://attendance.example.com/"

[logging]
log_level = "loud"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Unknown log format variant is a parse error, not a silent default.
#[test]
fn unknown_log_format_is_rejected() {
    let toml = r#"
[logging]
log_format = "json"
"#;

    assert!(load_config_from_str(toml).is_err());
}

/// The documented credential variable loads through the full pipeline.
#[test]
fn access_token_env_var_passes_validation() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("ROLLCALL_SERVICE_ACCESS_TOKEN", "jwt-from-env");

        let config = load_and_validate().map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        })?;
        assert_eq!(config.service.access_token.as_deref(), Some("jwt-from-env"));
        Ok(())
    });
}

/// Multi-word scanner keys map into their section.
#[test]
fn scanner_env_var_overrides_debounce() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("ROLLCALL_SCANNER_HOLD_LOCK_DURING_CONFIRMATION", "true");
        jail.set_env("ROLLCALL_SCANNER_DEBOUNCE_MS", "1200");

        let config = load_and_validate().map_err(|errors| format!("{} errors", errors.len()))?;
        assert!(config.scanner.hold_lock_during_confirmation);
        assert_eq!(config.scanner.debounce_ms, 1200);
        Ok(())
    });
}
