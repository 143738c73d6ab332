// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire shapes of the attendance service, validated before use.

use std::str::FromStr;

use rollcall_core::{
    Identity, ParentNumber, RecordStatus, RollcallError, StatusLookup, StudentId, StudentRecord,
};
use serde::{Deserialize, Serialize};

/// `GET status/{identity}` response body.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub record: Option<StatusRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRecord {
    pub status: String,
}

impl StatusResponse {
    /// Collapse the loosely-typed body into a [`StatusLookup`].
    pub fn into_lookup(self) -> Result<StatusLookup, RollcallError> {
        if let Some(error) = self.error {
            return Err(RollcallError::service(error));
        }
        if !self.found {
            return Ok(StatusLookup::NotFound);
        }
        let record = self
            .record
            .ok_or_else(|| RollcallError::service("malformed status response: missing record"))?;
        let status = RecordStatus::from_str(&record.status).map_err(|_| {
            RollcallError::service(format!(
                "malformed status response: unknown status `{}`",
                record.status
            ))
        })?;
        Ok(StatusLookup::Found(status))
    }
}

/// Body of the `checkin`, `checkout`, and `sendMessage` requests.
#[derive(Debug, Serialize)]
pub struct NameRequest<'a> {
    pub name: &'a Identity,
}

/// Response body of mutation endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET students` response body.
#[derive(Debug, Deserialize)]
pub struct RosterResponse {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `sendMessage` answers with a bare boolean on success, or an error object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NotifyResponse {
    Sent(bool),
    Failed(CommandResponse),
}

/// A student as listed by `GET all-students`, with its parent link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrolledStudent {
    pub id: StudentId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<StudentId>,
    #[serde(default)]
    pub parents: Option<ParentContact>,
}

impl EnrolledStudent {
    pub fn phone_number(&self) -> Option<&str> {
        self.parents.as_ref()?.phone_number.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParentContact {
    #[serde(default, deserialize_with = "phone_as_text")]
    pub phone_number: Option<String>,
}

/// The backend stores phone numbers as integers in some deployments.
fn phone_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Phone {
        Number(u64),
        Text(String),
    }

    Ok(Option::<Phone>::deserialize(deserializer)?.map(|phone| match phone {
        Phone::Number(n) => n.to_string(),
        Phone::Text(s) => s,
    }))
}

/// `GET all-students` response body.
#[derive(Debug, Deserialize)]
pub struct EnrolledStudentsResponse {
    #[serde(default)]
    pub students: Vec<EnrolledStudent>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One entry of an enrolment batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    pub name: String,
    #[serde(rename = "parentNumber")]
    pub parent_number: ParentNumber,
}

impl NewStudent {
    /// Both fields are required; the number must be eight digits.
    pub fn new(name: &str, parent_number: &str) -> Result<Self, RollcallError> {
        let name = name.trim();
        if name.is_empty() || parent_number.trim().is_empty() {
            return Err(RollcallError::InvalidInput(
                "Name and number required.".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            parent_number: ParentNumber::parse(parent_number)?,
        })
    }
}

/// `POST students` request body.
#[derive(Debug, Serialize)]
pub struct AddStudentsRequest<'a> {
    pub students: &'a [NewStudent],
}

/// `POST update-student` request body.
#[derive(Debug, Serialize)]
pub struct UpdateStudentRequest<'a> {
    pub id: &'a StudentId,
    pub parent_id: Option<&'a StudentId>,
    pub name: &'a str,
    pub parent_number: &'a ParentNumber,
}

/// `DELETE {id}` response body.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
