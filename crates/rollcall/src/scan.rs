// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rollcall scan`: the terminal scanning surface.
//!
//! Keyboard-wedge QR readers type one line per symbol, so every stdin
//! line is a scan. While a re-check-in prompt is open a `y`/`n` line
//! answers it instead; anything else is still treated as a scan.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use colored::Colorize;
use rollcall_client::{AttendanceClient, StaticCredential};
use rollcall_config::RollcallConfig;
use rollcall_core::traits::confirm::recheckin_prompt;
use rollcall_core::{
    Action, Confirmation, Confirmer, CredentialProvider, Identity, RollcallError, ScanEvent,
    ScanFeedback,
};
use rollcall_scanner::{ReconcilerSettings, ScanReconciler, ScanStation, StationReport};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::commands::{check_mark, summary_line};

/// Scans buffered between the reader and the station.
const SCAN_BUFFER: usize = 32;

/// Runs the scan station on stdin until EOF or a shutdown signal.
pub async fn run_scan(config: RollcallConfig, cancel: CancellationToken) -> Result<(), RollcallError> {
    let client = Arc::new(AttendanceClient::from_config(&config.service)?);
    let credentials = Arc::new(StaticCredential::from_config(&config.service));
    if !credentials.is_present() {
        warn!("no access token configured, every scan will be rejected");
    }

    let prompts = Arc::new(PromptQueue::default());
    let confirmer = Arc::new(TerminalConfirmer::new(
        Arc::clone(&prompts),
        config.scanner.prompt_title.clone(),
    ));
    let feedback = Arc::new(TerminalFeedback::new(
        Arc::clone(&client),
        Arc::clone(&credentials),
    ));
    let reconciler = ScanReconciler::new(
        ReconcilerSettings::from(&config.scanner),
        client.clone(),
        credentials,
        confirmer,
        feedback,
    );
    let station = ScanStation::new(Arc::new(reconciler));

    info!(
        base_url = %client.base_url(),
        debounce_ms = config.scanner.debounce_ms,
        "scan station ready"
    );
    println!("Ready to scan. Press Ctrl+D to finish.");

    let (tx, rx) = mpsc::channel(SCAN_BUFFER);
    let reader = tokio::spawn(read_scans(
        BufReader::new(tokio::io::stdin()),
        tx,
        Arc::clone(&prompts),
        cancel.clone(),
    ));

    let report = station.run(rx, cancel).await;
    reader.abort();
    let open = prompts.len();
    if open > 0 {
        debug!(open, "cancelling unanswered prompts");
    }
    prompts.cancel_all();

    print_report(&report);
    Ok(())
}

/// Route input lines to the open prompt or to the station.
///
/// Returns when input ends, the station stops listening, or `cancel` fires.
/// Open prompts are cancelled on the way out.
pub(crate) async fn read_scans<R>(
    input: R,
    scans: mpsc::Sender<ScanEvent>,
    prompts: Arc<PromptQueue>,
    cancel: CancellationToken,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("scan input reached end of file");
                break;
            }
            Err(e) => {
                warn!(error = %e, "failed to read scan input");
                break;
            }
        };

        if let Some(answer) = parse_answer(&line)
            && prompts.answer(answer)
        {
            continue;
        }
        if scans.send(ScanEvent::now(line)).await.is_err() {
            break;
        }
    }
    prompts.cancel_all();
}

/// `y`/`yes` or `n`/`no`, case-insensitive.
pub(crate) fn parse_answer(line: &str) -> Option<Confirmation> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Confirmation::Confirmed),
        "n" | "no" => Some(Confirmation::Cancelled),
        _ => None,
    }
}

/// Open re-check-in prompts, oldest first.
///
/// Once closed, nobody is left to answer: prompts opened afterwards
/// resolve as cancelled straight away.
#[derive(Default)]
pub(crate) struct PromptQueue {
    state: Mutex<PromptState>,
}

#[derive(Default)]
struct PromptState {
    waiting: VecDeque<oneshot::Sender<Confirmation>>,
    closed: bool,
}

impl PromptQueue {
    fn open(&self) -> oneshot::Receiver<Confirmation> {
        let (tx, rx) = oneshot::channel();
        let mut state = self.lock();
        if state.closed {
            debug!("prompt opened after input closed, cancelling");
        } else {
            state.waiting.push_back(tx);
        }
        rx
    }

    /// Deliver `answer` to the oldest open prompt. False if none is open.
    pub(crate) fn answer(&self, answer: Confirmation) -> bool {
        let mut state = self.lock();
        while let Some(tx) = state.waiting.pop_front() {
            // A closed receiver belongs to an abandoned scan; try the next one.
            if tx.send(answer).is_ok() {
                return true;
            }
        }
        false
    }

    /// Close the queue. Dropping the senders resolves every open prompt
    /// as cancelled.
    pub(crate) fn cancel_all(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.waiting.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().waiting.len()
    }

    fn lock(&self) -> MutexGuard<'_, PromptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Asks on the terminal and waits for a `y`/`n` line.
pub(crate) struct TerminalConfirmer {
    prompts: Arc<PromptQueue>,
    title: String,
}

impl TerminalConfirmer {
    pub(crate) fn new(prompts: Arc<PromptQueue>, title: String) -> Self {
        Self { prompts, title }
    }
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm_recheckin(&self, identity: &Identity) -> Confirmation {
        let answer = self.prompts.open();
        println!(
            "{}\n{} [y/N]",
            self.title.yellow().bold(),
            recheckin_prompt(identity)
        );
        answer.await.unwrap_or(Confirmation::Cancelled)
    }
}

/// Bell, colored status lines, and a roster summary after each command.
pub(crate) struct TerminalFeedback {
    client: Arc<AttendanceClient>,
    credentials: Arc<StaticCredential>,
}

impl TerminalFeedback {
    pub(crate) fn new(client: Arc<AttendanceClient>, credentials: Arc<StaticCredential>) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl ScanFeedback for TerminalFeedback {
    async fn acknowledge(&self, identity: &Identity) {
        print!("\x07");
        let _ = std::io::stdout().flush();
        println!("{} scanned {}", "•".cyan(), identity.as_str().bold());
    }

    async fn completed(&self, action: &Action) {
        let done = match action {
            Action::CheckIn(_) => "checked in",
            Action::CheckOut(_) => "checked out",
        };
        println!("{} {} {done}", check_mark(true), action.identity());
    }

    async fn alert(&self, error: &RollcallError) {
        eprintln!(
            "{} {}",
            format!("{}:", error.title()).red().bold(),
            error.user_message().red()
        );
    }

    async fn return_to_roster(&self) {
        let Some(token) = self.credentials.access_token().await else {
            return;
        };
        match self.client.list_students(&token).await {
            Ok(students) => println!("{}", summary_line(&students).dimmed()),
            Err(e) => debug!(error = %e, "roster refresh failed"),
        }
    }
}

fn print_report(report: &StationReport) {
    println!();
    println!("  rollcall scan");
    println!("  {}", "-".repeat(35));
    println!("    Scans:     {} accepted, {} ignored", report.accepted, report.ignored);
    println!(
        "    Results:   {} completed, {} cancelled, {} failed",
        report.completed, report.cancelled, report.failed
    );
    if report.abandoned > 0 {
        println!("    Abandoned: {}", report.abandoned.to_string().yellow());
    }
    println!();
}
