// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `callsight serve` command implementation.
//!
//! Opens the record store, builds the Gemini provider and the pipeline, and
//! serves the HTTP API until SIGINT/SIGTERM. The store is closed after the
//! server has drained.

use std::sync::Arc;

use callsight_config::CallsightConfig;
use callsight_core::{CallsightError, RecordStore};
use callsight_gateway::AppState;
use callsight_gemini::GeminiProvider;
use callsight_pipeline::{InsightExtractor, Pipeline, RetryPolicy};
use callsight_storage::SqliteRecordStore;
use tracing::{info, warn};

use crate::shutdown;

/// The wired pipeline plus the concrete store, kept for shutdown.
pub struct Services {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<SqliteRecordStore>,
}

/// Builds the pipeline from validated configuration.
///
/// Opens the connection pool and creates `call_records` if absent. Any
/// failure here is fatal for startup.
pub async fn build_services(config: &CallsightConfig) -> Result<Services, CallsightError> {
    let store = Arc::new(SqliteRecordStore::new(&config.storage)?);
    store.initialize().await?;

    let provider = Arc::new(GeminiProvider::new(&config.gemini)?);
    let extractor = InsightExtractor::new(provider, RetryPolicy::from_config(&config.gemini))?;
    let pipeline = Arc::new(Pipeline::new(extractor, store.clone()));

    Ok(Services { pipeline, store })
}

/// Runs the `callsight serve` command.
pub async fn run_serve(config: CallsightConfig) -> Result<(), CallsightError> {
    info!("starting callsight serve");

    let services = build_services(&config).await?;
    let cancel = shutdown::install_signal_handler();
    let shutdown_signal = cancel.clone().cancelled_owned();

    let served = callsight_gateway::start_server(
        &config.gateway,
        AppState::new(services.pipeline.clone()),
        shutdown_signal,
    )
    .await;

    // Stop the signal task even when the server failed to start.
    cancel.cancel();

    if let Err(e) = services.store.close().await {
        warn!(error = %e, "record store did not close cleanly");
    }

    served?;
    info!("callsight serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `callsight analyze` can print JSON on stdout.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("callsight={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
