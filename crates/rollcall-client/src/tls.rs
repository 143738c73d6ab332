// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport policy for the attendance service base URL.

use rollcall_core::RollcallError;
use tracing::error;
use url::{Host, Url};

/// Parse `base_url` and enforce the TLS policy.
///
/// Localhost may use any scheme; remote hosts must use HTTPS when
/// `require_tls` is set.
pub fn validate_base_url(base_url: &str, require_tls: bool) -> Result<Url, RollcallError> {
    let parsed = Url::parse(base_url.trim())
        .map_err(|e| RollcallError::Config(format!("invalid service URL `{base_url}`: {e}")))?;

    if parsed.cannot_be_a_base() {
        return Err(RollcallError::Config(format!(
            "service URL `{base_url}` cannot be used as a base"
        )));
    }

    if require_tls && !is_loopback(&parsed) && parsed.scheme() != "https" {
        error!(url = %base_url, "TLS required for remote attendance service");
        return Err(RollcallError::Config(
            "TLS required for remote attendance service -- use HTTPS".to_string(),
        ));
    }

    Ok(parsed)
}

/// Check if the URL's host refers to the local machine.
///
/// Only the `localhost` name and loopback IP literals qualify; a domain
/// that merely starts with `127.` is remote.
pub fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}
