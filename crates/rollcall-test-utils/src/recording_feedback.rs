// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback sink that captures every cue for assertion in tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use rollcall_core::{Action, Identity, RollcallError, ScanFeedback};

/// One captured feedback cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    Acknowledged(String),
    Completed(Action),
    /// Alert title and user-facing message.
    Alert { title: String, message: String },
    ReturnedToRoster,
}

#[derive(Default)]
pub struct RecordingFeedback {
    events: Arc<Mutex<Vec<FeedbackEvent>>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                FeedbackEvent::Alert { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn acknowledgements(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, FeedbackEvent::Acknowledged(_)))
            .count()
    }

    fn push(&self, event: FeedbackEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[async_trait]
impl ScanFeedback for RecordingFeedback {
    async fn acknowledge(&self, identity: &Identity) {
        self.push(FeedbackEvent::Acknowledged(identity.to_string()));
    }

    async fn completed(&self, action: &Action) {
        self.push(FeedbackEvent::Completed(action.clone()));
    }

    async fn alert(&self, error: &RollcallError) {
        self.push(FeedbackEvent::Alert {
            title: error.title().to_string(),
            message: error.user_message(),
        });
    }

    async fn return_to_roster(&self) {
        self.push(FeedbackEvent::ReturnedToRoster);
    }
}
