// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the service client, the reconciler, and the CLI.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::time::Instant;

use crate::error::RollcallError;

/// The trimmed text of a scan, used as the lookup key for a person record.
///
/// Uniqueness is not enforced here; the backend is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Normalizes a raw scan payload into an identity.
    ///
    /// Surrounding whitespace is trimmed; an empty result is rejected with
    /// [`RollcallError::InvalidPayload`].
    pub fn parse(raw_payload: &str) -> Result<Self, RollcallError> {
        let trimmed = raw_payload.trim();
        if trimmed.is_empty() {
            return Err(RollcallError::InvalidPayload);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current attendance state of an identity, as reported by the service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    NotFound,
    CheckedIn,
    CheckedOut,
}

/// Status carried by an existing attendance record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    CheckedIn,
    CheckedOut,
}

impl From<RecordStatus> for AttendanceStatus {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::CheckedIn => AttendanceStatus::CheckedIn,
            RecordStatus::CheckedOut => AttendanceStatus::CheckedOut,
        }
    }
}

/// Result of a status query, validated at the service boundary.
///
/// Backend errors never reach this type; they surface as
/// [`RollcallError::Service`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLookup {
    /// The identity has an attendance record for today.
    Found(RecordStatus),
    /// No record exists for the identity.
    NotFound,
}

impl StatusLookup {
    pub fn status(&self) -> AttendanceStatus {
        match self {
            Self::Found(status) => (*status).into(),
            Self::NotFound => AttendanceStatus::NotFound,
        }
    }
}

/// The single attendance command a reconciliation emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CheckIn(Identity),
    CheckOut(Identity),
}

impl Action {
    pub fn identity(&self) -> &Identity {
        match self {
            Self::CheckIn(id) | Self::CheckOut(id) => id,
        }
    }

    /// Verb used in logs and operator messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::CheckIn(_) => "check-in",
            Self::CheckOut(_) => "check-out",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.identity())
    }
}

/// A raw scan as delivered by the scanning surface. Consumed once.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub raw_payload: String,
    /// Monotonic time the surface observed the symbol.
    pub observed_at: Instant,
}

impl ScanEvent {
    pub fn new(raw_payload: impl Into<String>, observed_at: Instant) -> Self {
        Self {
            raw_payload: raw_payload.into(),
            observed_at,
        }
    }

    /// A scan observed right now.
    pub fn now(raw_payload: impl Into<String>) -> Self {
        Self::new(raw_payload, Instant::now())
    }
}

/// Operator's answer to the "check in again?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

/// Bearer credential obtained from the session provider.
///
/// The secret is never exposed through `Debug`.
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Value for the `Authorization: Bearer` header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for AccessToken {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_owned())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Backend identifier of a student row; numeric or textual depending on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentId {
    Number(i64),
    Text(String),
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl std::str::FromStr for StudentId {
    type Err = std::convert::Infallible;

    /// Digit-only input becomes a numeric id; anything else is kept as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(s.to_string())))
    }
}

/// A parent's phone number: exactly eight ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ParentNumber(String);

impl ParentNumber {
    pub const DIGITS: usize = 8;

    /// Trims `raw` and rejects anything but eight digits with
    /// [`RollcallError::InvalidInput`].
    pub fn parse(raw: &str) -> Result<Self, RollcallError> {
        let trimmed = raw.trim();
        if trimmed.len() != Self::DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RollcallError::InvalidInput(format!(
                "Please enter a valid {}-digit phone number (got `{trimmed}`).",
                Self::DIGITS
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ParentNumber {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One row of today's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default)]
    pub id: Option<StudentId>,
    pub student_name: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub parent_notified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_trims_surrounding_whitespace() {
        let id = Identity::parse("  JASPER KOH  ").unwrap();
        assert_eq!(id.as_str(), "JASPER KOH");
        assert_eq!(id.to_string(), "JASPER KOH");
    }

    #[test]
    fn identity_keeps_inner_whitespace() {
        let id = Identity::parse("\tOH  CHARMIAN\n").unwrap();
        assert_eq!(id.as_str(), "OH  CHARMIAN");
    }

    proptest! {
        #[test]
        fn whitespace_only_payload_is_invalid(raw in "[ \t\r\n]*") {
            prop_assert!(matches!(Identity::parse(&raw), Err(RollcallError::InvalidPayload)));
        }

        #[test]
        fn parsed_identity_never_has_outer_whitespace(raw in "\\PC*") {
            if let Ok(id) = Identity::parse(&raw) {
                prop_assert_eq!(id.as_str(), id.as_str().trim());
                prop_assert!(!id.as_str().is_empty());
            }
        }
    }

    #[test]
    fn attendance_status_wire_strings() {
        use std::str::FromStr;

        for (status, wire) in [
            (AttendanceStatus::NotFound, "not_found"),
            (AttendanceStatus::CheckedIn, "checked_in"),
            (AttendanceStatus::CheckedOut, "checked_out"),
        ] {
            assert_eq!(status.to_string(), wire);
            assert_eq!(AttendanceStatus::from_str(wire).unwrap(), status);
        }
    }

    #[test]
    fn lookup_collapses_to_status() {
        assert_eq!(StatusLookup::NotFound.status(), AttendanceStatus::NotFound);
        assert_eq!(
            StatusLookup::Found(RecordStatus::CheckedOut).status(),
            AttendanceStatus::CheckedOut
        );
    }

    #[test]
    fn action_display() {
        let action = Action::CheckOut(Identity::parse("KAI SUBRATA").unwrap());
        assert_eq!(action.to_string(), "check-out KAI SUBRATA");
        assert_eq!(action.identity().as_str(), "KAI SUBRATA");
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-jwt");
        assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
        assert_eq!(token.clone().expose(), "secret-jwt");
    }

    #[test]
    fn student_record_accepts_numeric_and_text_ids() {
        let rows: Vec<StudentRecord> = serde_json::from_str(
            r#"[
                {"id": 7, "student_name": "ONA NEO", "status": "checked_in"},
                {"id": "b2f1", "student_name": "WANG YOU", "status": "checked_out", "parent_notified": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows[0].id, Some(StudentId::Number(7)));
        assert!(!rows[0].parent_notified);
        assert_eq!(rows[1].id.as_ref().unwrap().to_string(), "b2f1");
        assert_eq!(rows[1].status, RecordStatus::CheckedOut);
    }

    #[test]
    fn parent_number_requires_eight_digits() {
        assert_eq!(ParentNumber::parse(" 91234567 ").unwrap().as_str(), "91234567");
        for bad in ["", "9123456", "912345678", "9123 4567", "+6591234", "9123456a", "１２３４５６７８"] {
            let err = ParentNumber::parse(bad).unwrap_err();
            assert!(matches!(err, RollcallError::InvalidInput(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn student_id_from_cli_text() {
        assert_eq!("42".parse::<StudentId>().unwrap(), StudentId::Number(42));
        assert_eq!(
            " b2f1 ".parse::<StudentId>().unwrap(),
            StudentId::Text("b2f1".into())
        );
    }

    proptest! {
        #[test]
        fn any_eight_digit_string_is_a_parent_number(n in 0u32..100_000_000) {
            let raw = format!("{n:08}");
            prop_assert_eq!(ParentNumber::parse(&raw).unwrap().to_string(), raw);
        }
    }
}
