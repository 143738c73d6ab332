// SPDX-FileCopyrightText: 2026 Rollcall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rollcall - QR scan check-in/check-out station.
//!
//! This is the binary entry point.

mod commands;
mod scan;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use rollcall_config::model::{LogFormat, LoggingConfig};
use rollcall_config::RollcallConfig;
use rollcall_core::{RollcallError, StudentId};

/// Rollcall - QR scan check-in/check-out station.
#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scan station, reading one QR payload per line from stdin.
    Scan,
    /// Show the attendance status of a student.
    Status { name: String },
    /// Check a student in.
    CheckIn { name: String },
    /// Check a student out.
    CheckOut { name: String },
    /// List today's roster.
    Roster {
        /// Only show students whose name contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Message a student's parents.
    Notify { name: String },
    /// Close the day and send the daily report.
    FinishDay,
    /// List every enrolled student with their parent number.
    Students {
        /// Only show students whose name contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Enrol a student with an 8-digit parent phone number.
    AddStudent { name: String, parent_number: String },
    /// Change the parent phone number of an enrolled student.
    SetParent { id: StudentId, parent_number: String },
    /// Delete an enrolled student.
    RemoveStudent {
        id: StudentId,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Enrol students in bulk from a CSV file.
    UploadCsv { path: PathBuf },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => rollcall_config::load_and_validate_path(path),
        None => rollcall_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            rollcall_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);

    if let Err(e) = dispatch(cli.command, config).await {
        eprintln!("{} {}", format!("{}:", e.title()).red().bold(), e.user_message());
        std::process::exit(1);
    }
}

async fn dispatch(command: Option<Commands>, config: RollcallConfig) -> Result<(), RollcallError> {
    match command {
        Some(Commands::Scan) => {
            let cancel = shutdown::install_signal_handler();
            scan::run_scan(config, cancel).await
        }
        Some(Commands::Status { name }) => commands::run_status(&config, &name).await,
        Some(Commands::CheckIn { name }) => commands::run_check_in(&config, &name).await,
        Some(Commands::CheckOut { name }) => commands::run_check_out(&config, &name).await,
        Some(Commands::Roster { search }) => {
            commands::run_roster(&config, search.as_deref()).await
        }
        Some(Commands::Notify { name }) => commands::run_notify(&config, &name).await,
        Some(Commands::FinishDay) => commands::run_finish_day(&config).await,
        Some(Commands::Students { search }) => {
            commands::run_students(&config, search.as_deref()).await
        }
        Some(Commands::AddStudent { name, parent_number }) => {
            commands::run_add_student(&config, &name, &parent_number).await
        }
        Some(Commands::SetParent { id, parent_number }) => {
            commands::run_set_parent(&config, &id, &parent_number).await
        }
        Some(Commands::RemoveStudent { id, yes }) => {
            commands::run_remove_student(&config, &id, yes).await
        }
        Some(Commands::UploadCsv { path }) => commands::run_upload_csv(&config, &path).await,
        Some(Commands::Config) => commands::run_config(&config),
        None => {
            println!("rollcall: use --help for available commands");
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rollcall={},warn", logging.log_level)));

    // Logs go to stderr so they never interleave with station output.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    match logging.log_format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
