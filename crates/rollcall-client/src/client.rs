// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the attendance service.
//!
//! Provides [`AttendanceClient`], which builds endpoint URLs, attaches the
//! bearer credential, and validates every response body at the boundary.
//! Failed calls are never retried: a failed check-in or check-out needs a
//! fresh scan.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use rollcall_config::model::ServiceConfig;
use rollcall_core::{
    AccessToken, Identity, ParentNumber, RollcallError, StatusLookup, StudentId, StudentRecord,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::tls::validate_base_url;
use crate::types::{
    AddStudentsRequest, CommandResponse, DeleteResponse, EnrolledStudent, EnrolledStudentsResponse,
    NameRequest, NewStudent, NotifyResponse, RosterResponse, StatusResponse, UpdateStudentRequest,
};

/// HTTP client for attendance service communication.
#[derive(Debug, Clone)]
pub struct AttendanceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl AttendanceClient {
    /// Creates a client for `base_url` with a total per-request timeout.
    ///
    /// No TLS policy is applied; see [`AttendanceClient::from_config`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RollcallError> {
        let base_url = validate_base_url(base_url, false)?;
        Self::build(base_url, timeout)
    }

    /// Creates a client from the `[service]` configuration section.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, RollcallError> {
        let base_url = validate_base_url(&config.base_url, config.require_tls)?;
        Self::build(base_url, Duration::from_secs(config.request_timeout_secs))
    }

    fn build(base_url: Url, timeout: Duration) -> Result<Self, RollcallError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RollcallError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves the attendance status of `identity`.
    pub async fn status(
        &self,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<StatusLookup, RollcallError> {
        let url = self.endpoint(&["status", identity.as_str()])?;
        debug!(identity = %identity, "looking up attendance status");

        let response = self.send(self.client.get(url), token).await?;
        let body: StatusResponse = read_json(response).await?;
        let lookup = body.into_lookup()?;
        debug!(identity = %identity, status = %lookup.status(), "status resolved");
        Ok(lookup)
    }

    /// `POST checkin {name}`.
    pub async fn check_in(&self, identity: &Identity, token: &AccessToken) -> Result<(), RollcallError> {
        self.command("checkin", identity, token).await
    }

    /// `POST checkout {name}`.
    pub async fn check_out(&self, identity: &Identity, token: &AccessToken) -> Result<(), RollcallError> {
        self.command("checkout", identity, token).await
    }

    /// Today's roster.
    pub async fn list_students(&self, token: &AccessToken) -> Result<Vec<StudentRecord>, RollcallError> {
        let url = self.endpoint(&["students"])?;
        let response = self.send(self.client.get(url), token).await?;
        let body: RosterResponse = read_json(response).await?;
        if let Some(error) = body.error {
            return Err(RollcallError::service(error));
        }
        debug!(count = body.students.len(), "roster fetched");
        Ok(body.students)
    }

    /// Ask the backend to message the parents of `identity`.
    ///
    /// Returns whether the backend reports the message as sent.
    pub async fn notify_parent(
        &self,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<bool, RollcallError> {
        let url = self.endpoint(&["sendMessage"])?;
        let request = self.client.post(url).json(&NameRequest { name: identity });
        let response = self.send(request, token).await?;
        match read_json::<NotifyResponse>(response).await? {
            NotifyResponse::Sent(sent) => Ok(sent),
            NotifyResponse::Failed(CommandResponse { error: Some(error) }) => {
                Err(RollcallError::service(error))
            }
            NotifyResponse::Failed(CommandResponse { error: None }) => Ok(false),
        }
    }

    /// Close the day; the backend sends its daily report.
    pub async fn finish_day(&self, token: &AccessToken) -> Result<(), RollcallError> {
        let url = self.endpoint(&["finish-day"])?;
        let response = self.send(self.client.post(url), token).await?;
        check_command_response(response).await
    }

    /// Every enrolled student, independent of today's attendance.
    pub async fn list_all_students(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<EnrolledStudent>, RollcallError> {
        let url = self.endpoint(&["all-students"])?;
        let response = self.send(self.client.get(url), token).await?;
        let body: EnrolledStudentsResponse = read_json(response).await?;
        if let Some(error) = body.error {
            return Err(RollcallError::service(error));
        }
        debug!(count = body.students.len(), "enrolment fetched");
        Ok(body.students)
    }

    /// Enrol a batch of students. An empty batch sends nothing.
    pub async fn add_students(
        &self,
        students: &[NewStudent],
        token: &AccessToken,
    ) -> Result<(), RollcallError> {
        if students.is_empty() {
            debug!("no students to add");
            return Ok(());
        }
        let url = self.endpoint(&["students"])?;
        let request = self.client.post(url).json(&AddStudentsRequest { students });
        let response = self.send(request, token).await?;
        check_command_response(response).await?;
        info!(count = students.len(), "students enrolled");
        Ok(())
    }

    /// Replace the parent phone number on file for `student`.
    pub async fn update_parent_number(
        &self,
        student: &EnrolledStudent,
        parent_number: &ParentNumber,
        token: &AccessToken,
    ) -> Result<(), RollcallError> {
        let url = self.endpoint(&["update-student"])?;
        let request = self.client.post(url).json(&UpdateStudentRequest {
            id: &student.id,
            parent_id: student.parent_id.as_ref(),
            name: &student.name,
            parent_number,
        });
        let response = self.send(request, token).await?;
        check_command_response(response).await?;
        info!(student = %student.id, "parent number updated");
        Ok(())
    }

    /// `DELETE {id}`. Returns the backend's confirmation message, if any.
    pub async fn delete_student(
        &self,
        id: &StudentId,
        token: &AccessToken,
    ) -> Result<Option<String>, RollcallError> {
        let url = self.endpoint(&[&id.to_string()])?;
        let response = self.send(self.client.delete(url), token).await?;
        let status = response.status();
        let body = response.text().await.map_err(RollcallError::network)?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }
        let parsed: DeleteResponse = serde_json::from_str(&body).map_err(|e| {
            RollcallError::service(format!("malformed response from attendance service: {e}"))
        })?;
        if let Some(error) = parsed.error {
            return Err(RollcallError::service(error));
        }
        info!(student = %id, "student deleted");
        Ok(parsed.message)
    }

    /// Upload a CSV roster as the multipart field `file`.
    pub async fn upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        token: &AccessToken,
    ) -> Result<(), RollcallError> {
        let url = self.endpoint(&["upload-csv"])?;
        let size = contents.len();
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| RollcallError::Internal(format!("failed to build CSV upload: {e}")))?;
        let request = self.client.post(url).multipart(Form::new().part("file", part));
        let response = self.send(request, token).await?;
        check_command_response(response).await?;
        info!(file = file_name, bytes = size, "CSV roster uploaded");
        Ok(())
    }

    async fn command(
        &self,
        path: &str,
        identity: &Identity,
        token: &AccessToken,
    ) -> Result<(), RollcallError> {
        let url = self.endpoint(&[path])?;
        debug!(identity = %identity, endpoint = path, "forwarding attendance command");

        let request = self.client.post(url).json(&NameRequest { name: identity });
        let response = self.send(request, token).await?;
        check_command_response(response).await
    }

    /// Attach the bearer credential and map transport failures.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: &AccessToken,
    ) -> Result<Response, RollcallError> {
        request
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "attendance service unreachable");
                RollcallError::network(e)
            })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RollcallError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RollcallError::Config("service URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Read a JSON body, turning non-success statuses into service errors.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RollcallError> {
    let status = response.status();
    let body = response.text().await.map_err(RollcallError::network)?;

    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!(status = %status, error = %e, "malformed response from attendance service");
        RollcallError::service(format!("malformed response from attendance service: {e}"))
    })
}

/// Mutation endpoints answer `{error?}`; an empty success body is accepted.
async fn check_command_response(response: Response) -> Result<(), RollcallError> {
    let status = response.status();
    let body = response.text().await.map_err(RollcallError::network)?;

    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }
    if body.trim().is_empty() {
        return Ok(());
    }

    let parsed: CommandResponse = serde_json::from_str(&body).map_err(|e| {
        RollcallError::service(format!("malformed response from attendance service: {e}"))
    })?;
    match parsed.error {
        Some(error) => Err(RollcallError::service(error)),
        None => Ok(()),
    }
}

/// Prefer the backend's `error` field; fall back to the HTTP status.
fn error_from_body(status: StatusCode, body: &str) -> RollcallError {
    let message = serde_json::from_str::<CommandResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| format!("attendance service returned {status}"));
    warn!(status = %status, message = %message, "attendance service rejected request");
    RollcallError::service(message)
}
