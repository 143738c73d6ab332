// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock attendance service for deterministic testing.
//!
//! `MockAttendanceService` answers status lookups from a pre-configured
//! table and records every call so tests can assert on exactly which
//! backend requests a scan produced.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use rollcall_core::{AccessToken, AttendanceService, Identity, RollcallError, StatusLookup};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    LookupStatus(String),
    CheckIn(String),
    CheckOut(String),
}

impl ServiceCall {
    /// True for check-in and check-out.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::LookupStatus(_))
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Status(StatusLookup),
    Error(String),
    Unreachable,
}

/// A mock attendance backend.
///
/// Identities without a scripted status resolve to `NotFound`.
pub struct MockAttendanceService {
    statuses: Mutex<HashMap<String, Scripted>>,
    command_error: Mutex<Option<String>>,
    calls: Arc<Mutex<Vec<ServiceCall>>>,
    lookup_gate: Option<Arc<Semaphore>>,
}

impl MockAttendanceService {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(HashMap::new()),
            command_error: Mutex::new(None),
            calls: Arc::new(Mutex::new(Vec::new())),
            lookup_gate: None,
        }
    }

    /// Script the status returned for `name`.
    pub fn with_status(self, name: &str, lookup: StatusLookup) -> Self {
        self.script(name, Scripted::Status(lookup));
        self
    }

    /// Make status lookups for `name` fail with a backend error message.
    pub fn with_lookup_error(self, name: &str, message: &str) -> Self {
        self.script(name, Scripted::Error(message.to_string()));
        self
    }

    /// Make status lookups for `name` fail at the transport level.
    pub fn with_unreachable(self, name: &str) -> Self {
        self.script(name, Scripted::Unreachable);
        self
    }

    /// Make every check-in and check-out fail with `message`.
    pub fn with_command_error(self, message: &str) -> Self {
        *lock(&self.command_error) = Some(message.to_string());
        self
    }

    /// Block status lookups until a permit is added to the returned semaphore.
    pub fn with_gated_lookups(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.lookup_gate = Some(gate.clone());
        (self, gate)
    }

    fn script(&self, name: &str, scripted: Scripted) {
        lock(&self.statuses).insert(name.to_string(), scripted);
    }

    /// All calls in the order they were made.
    pub fn calls(&self) -> Vec<ServiceCall> {
        lock(&self.calls).clone()
    }

    /// Only check-in and check-out calls.
    pub fn mutations(&self) -> Vec<ServiceCall> {
        self.calls().into_iter().filter(ServiceCall::is_mutation).collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn record(&self, call: ServiceCall) {
        lock(&self.calls).push(call);
    }

    fn command_result(&self) -> Result<(), RollcallError> {
        match lock(&self.command_error).clone() {
            Some(message) => Err(RollcallError::service(message)),
            None => Ok(()),
        }
    }
}

impl Default for MockAttendanceService {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl AttendanceService for MockAttendanceService {
    async fn lookup_status(
        &self,
        identity: &Identity,
        _token: &AccessToken,
    ) -> Result<StatusLookup, RollcallError> {
        self.record(ServiceCall::LookupStatus(identity.to_string()));

        if let Some(gate) = &self.lookup_gate {
            gate.acquire()
                .await
                .map_err(|e| RollcallError::Internal(e.to_string()))?
                .forget();
        }

        let scripted = lock(&self.statuses).get(identity.as_str()).cloned();
        match scripted {
            Some(Scripted::Status(lookup)) => Ok(lookup),
            Some(Scripted::Error(message)) => Err(RollcallError::service(message)),
            Some(Scripted::Unreachable) => Err(RollcallError::network(std::io::Error::other(
                "connection refused",
            ))),
            None => Ok(StatusLookup::NotFound),
        }
    }

    async fn check_in(&self, identity: &Identity, _token: &AccessToken) -> Result<(), RollcallError> {
        self.record(ServiceCall::CheckIn(identity.to_string()));
        self.command_result()
    }

    async fn check_out(&self, identity: &Identity, _token: &AccessToken) -> Result<(), RollcallError> {
        self.record(ServiceCall::CheckOut(identity.to_string()));
        self.command_result()
    }
}
