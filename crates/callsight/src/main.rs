// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Callsight - conversational transcript insight service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod analyze;
mod serve;
mod shutdown;

use std::path::PathBuf;

use callsight_core::{CallsightError, ErrorCategory};
use clap::{Parser, Subcommand};
use tracing::error;

use crate::analyze::TranscriptSource;

/// Callsight - conversational transcript insight service.
#[derive(Parser, Debug)]
#[command(name = "callsight", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API.
    Serve,
    /// Analyze one transcript and print the stored outcome as JSON.
    Analyze {
        /// Read the transcript from a file.
        #[arg(long, short, value_name = "PATH", conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Transcript text; `-` or nothing reads stdin.
        text: Option<String>,
    },
}

/// Process exit code for a failed command.
fn exit_code(err: &CallsightError) -> i32 {
    match err.category() {
        ErrorCategory::ClientInput => 2,
        ErrorCategory::Service => 3,
        ErrorCategory::Storage => 4,
        ErrorCategory::Internal => 1,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let config = match &cli.config {
        Some(path) => callsight_config::load_and_validate_path(path),
        None => callsight_config::load_and_validate(),
    };
    let config = match config {
        Ok(config) => config,
        Err(errors) => {
            callsight_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    serve::init_tracing(&config.service.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Analyze { file, text } => {
            analyze::run_analyze(config, TranscriptSource::from_args(file, text)).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "callsight exited with an error");
        eprintln!("error: {e}");
        std::process::exit(exit_code(&e));
    }
}
