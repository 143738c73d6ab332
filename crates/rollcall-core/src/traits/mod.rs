// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits the reconciler depends on.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility so
//! the reconciler can hold them as `Arc<dyn ...>`.

pub mod confirm;
pub mod credential;
pub mod feedback;
pub mod service;

pub use confirm::Confirmer;
pub use credential::CredentialProvider;
pub use feedback::ScanFeedback;
pub use service::AttendanceService;
