// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use callsight_config::model::GatewayConfig;
use callsight_core::CallsightError;
use callsight_pipeline::Pipeline;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The analysis pipeline, shared by every request.
    pub pipeline: Arc<Pipeline>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            start_time: Instant::now(),
        }
    }
}

/// Build the router:
/// - POST /analyze_call
/// - GET / (liveness)
/// - GET /health (store health)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::get_status))
        .route("/health", get(handlers::get_health))
        .route("/analyze_call", post(handlers::post_analyze_call))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and serve until `shutdown` resolves.
///
/// In-flight requests are allowed to finish once shutdown begins.
pub async fn start_server<F>(
    config: &GatewayConfig,
    state: AppState,
    shutdown: F,
) -> Result<(), CallsightError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CallsightError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CallsightError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
