// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./rollcall.toml` > `~/.config/rollcall/rollcall.toml` > `/etc/rollcall/rollcall.toml`
//! with environment variable overrides via `ROLLCALL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RollcallConfig;

/// Local config file name, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "rollcall.toml";

/// System-wide config file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/rollcall/rollcall.toml";

/// Path of the per-user config file, if a config dir is known.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rollcall").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rollcall/rollcall.toml` (system-wide)
/// 3. `~/.config/rollcall/rollcall.toml` (user XDG config)
/// 4. `./rollcall.toml` (local directory)
/// 5. `ROLLCALL_*` environment variables
pub fn load_config() -> Result<RollcallConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RollcallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RollcallConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RollcallConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RollcallConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RollcallConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_file().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `ROLLCALL_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `ROLLCALL_SERVICE_ACCESS_TOKEN` must become
/// `service.access_token`, not `service.access.token`.
fn env_provider() -> Env {
    Env::prefixed("ROLLCALL_").map(|key| {
        // Keys arrive upper-cased.
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("service_", "service.", 1)
            .replacen("scanner_", "scanner.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ROLLCALL_SERVICE_ACCESS_TOKEN", "jwt-from-env");
            jail.set_env("ROLLCALL_SCANNER_DEBOUNCE_MS", "1500");
            jail.set_env("ROLLCALL_LOGGING_LOG_LEVEL", "debug");

            let config = load_config()?;
            assert_eq!(config.service.access_token.as_deref(), Some("jwt-from-env"));
            assert_eq!(config.scanner.debounce_ms, 1500);
            assert_eq!(config.logging.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
[service]
base_url = "https://attendance.example.com/api/db/"
"#,
            )?;

            let config = load_config()?;
            assert_eq!(
                config.service.base_url,
                "https://attendance.example.com/api/db/"
            );
            assert_eq!(config.scanner.debounce_ms, 2000);
            Ok(())
        });
    }

    #[test]
    fn env_wins_over_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[scanner]\ndebounce_ms = 3000\n")?;
            jail.set_env("ROLLCALL_SCANNER_DEBOUNCE_MS", "500");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.scanner.debounce_ms, 500);
            Ok(())
        });
    }
}
