// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `callsight analyze` command implementation.
//!
//! Runs one transcript through the same pipeline `serve` uses and prints the
//! outcome as pretty JSON on stdout.

use std::path::PathBuf;

use callsight_config::CallsightConfig;
use callsight_core::{CallsightError, RecordStore};
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::serve::build_services;

/// Where the transcript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    Inline(String),
    File(PathBuf),
    Stdin,
}

impl TranscriptSource {
    pub fn from_args(file: Option<PathBuf>, text: Option<String>) -> Self {
        match (file, text) {
            (Some(path), _) => Self::File(path),
            (None, Some(text)) if text != "-" => Self::Inline(text),
            _ => Self::Stdin,
        }
    }

    async fn read(self) -> Result<String, CallsightError> {
        match self {
            Self::Inline(text) => Ok(text),
            Self::File(path) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                CallsightError::Validation(format!("cannot read {}: {e}", path.display()))
            }),
            Self::Stdin => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .map_err(|e| CallsightError::Validation(format!("cannot read stdin: {e}")))?;
                Ok(text)
            }
        }
    }
}

/// Runs the `callsight analyze` command.
pub async fn run_analyze(
    config: CallsightConfig,
    source: TranscriptSource,
) -> Result<(), CallsightError> {
    let transcript = source.read().await?;
    let services = build_services(&config).await?;

    let result = services.pipeline.handle(&transcript).await;

    if let Err(e) = services.store.close().await {
        warn!(error = %e, "record store did not close cleanly");
    }

    let outcome = result?;
    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| CallsightError::Internal(format!("failed to encode outcome: {e}")))?;
    println!("{json}");
    Ok(())
}
