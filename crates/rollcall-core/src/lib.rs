// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rollcall attendance scan station.
//!
//! This crate provides the domain types, the error taxonomy, and the
//! collaborator traits (attendance service, credential source, operator
//! confirmation, feedback) that the reconciler is written against.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RollcallError;
pub use types::{
    AccessToken, Action, AttendanceStatus, Confirmation, Identity, ParentNumber, RecordStatus,
    ScanEvent, StatusLookup, StudentId, StudentRecord,
};

pub use traits::{AttendanceService, Confirmer, CredentialProvider, ScanFeedback};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_payload_is_silent() {
        let errors = [
            RollcallError::InvalidPayload,
            RollcallError::NoCredential,
            RollcallError::service("Database busy"),
            RollcallError::Network {
                message: "connection refused".into(),
                source: None,
            },
            RollcallError::InvalidInput("parent number must be 8 digits".into()),
            RollcallError::Config("bad url".into()),
            RollcallError::Internal("join failed".into()),
        ];
        let silent: Vec<bool> = errors.iter().map(RollcallError::is_silent).collect();
        assert_eq!(silent, [true, false, false, false, false, false, false]);
    }

    #[test]
    fn recheckin_prompt_names_the_identity() {
        let id = Identity::parse("CAELYN TEO").unwrap();
        assert_eq!(
            traits::confirm::recheckin_prompt(&id),
            "CAELYN TEO is already checked out. Check in again?"
        );
    }
}
