// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confirmers that stand in for the operator.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use rollcall_core::{Confirmation, Confirmer, Identity};

/// Answers prompts from a FIFO script; once exhausted, answers `fallback`.
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<Confirmation>>,
    fallback: Confirmation,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = Confirmation>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback: Confirmation::Cancelled,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer `answer`.
    pub fn always(answer: Confirmation) -> Self {
        Self {
            fallback: answer,
            ..Self::new(Vec::new())
        }
    }

    /// Identities the operator was asked about, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm_recheckin(&self, identity: &Identity) -> Confirmation {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identity.to_string());
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

/// A confirmer whose prompts stay open until the test answers them.
///
/// Models an operator who leaves the dialog on screen.
pub struct ManualConfirmer {
    opened: mpsc::UnboundedSender<String>,
    answers: AsyncMutex<mpsc::UnboundedReceiver<Confirmation>>,
}

/// Test-side handle of a [`ManualConfirmer`].
pub struct ManualConfirmerHandle {
    opened: mpsc::UnboundedReceiver<String>,
    answers: mpsc::UnboundedSender<Confirmation>,
}

impl ManualConfirmer {
    pub fn new() -> (Self, ManualConfirmerHandle) {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        let (answer_tx, answer_rx) = mpsc::unbounded_channel();
        (
            Self {
                opened: opened_tx,
                answers: AsyncMutex::new(answer_rx),
            },
            ManualConfirmerHandle {
                opened: opened_rx,
                answers: answer_tx,
            },
        )
    }
}

impl ManualConfirmerHandle {
    /// Wait until a prompt is shown; returns the identity it asks about.
    pub async fn prompt_opened(&mut self) -> Option<String> {
        self.opened.recv().await
    }

    pub fn answer(&self, answer: Confirmation) {
        let _ = self.answers.send(answer);
    }
}

#[async_trait]
impl Confirmer for ManualConfirmer {
    async fn confirm_recheckin(&self, identity: &Identity) -> Confirmation {
        let _ = self.opened.send(identity.to_string());
        // A dropped handle means nobody will ever answer.
        self.answers
            .lock()
            .await
            .recv()
            .await
            .unwrap_or(Confirmation::Cancelled)
    }
}
