// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use rollcall_core::{RecordStatus, StudentRecord};

use crate::types::EnrolledStudent;

/// Case-insensitive substring search on student names; an empty query keeps everything.
pub fn filter_roster<'a>(records: &'a [StudentRecord], query: &str) -> Vec<&'a StudentRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| r.student_name.to_lowercase().contains(&needle))
        .collect()
}

/// Same search as [`filter_roster`], over the enrolment list.
pub fn filter_enrolled<'a>(students: &'a [EnrolledStudent], query: &str) -> Vec<&'a EnrolledStudent> {
    let needle = query.trim().to_lowercase();
    students
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}

/// Counts of (checked in, checked out) rows.
pub fn presence_counts(records: &[StudentRecord]) -> (usize, usize) {
    let checked_in = records
        .iter()
        .filter(|r| r.status == RecordStatus::CheckedIn)
        .count();
    (checked_in, records.len() - checked_in)
}
