// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the analysis API.
//!
//! Handles POST /analyze_call, GET / and GET /health.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use callsight_core::{AnalysisOutcome, CallsightError, ErrorCategory, HealthStatus};

use crate::server::AppState;

/// Request body for POST /analyze_call.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Raw transcript text.
    pub transcript: String,
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: String,
    /// Binary version.
    pub version: String,
    pub uptime_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub detail: String,
}

/// A pipeline error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CallsightError);

impl ApiError {
    /// HTTP status for the error's category.
    pub fn status(&self) -> StatusCode {
        match self.0.category() {
            ErrorCategory::ClientInput => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::Service => StatusCode::BAD_GATEWAY,
            ErrorCategory::Storage => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                detail: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// POST /analyze_call
///
/// Runs the transcript through the pipeline and returns the stored record id
/// with the extracted insight.
pub async fn post_analyze_call(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisOutcome>, Response> {
    let Json(body) = body.map_err(|rejection| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                detail: rejection.body_text(),
            }),
        )
            .into_response()
    })?;

    state
        .pipeline
        .handle(&body.transcript)
        .await
        .map(Json)
        .map_err(|e| ApiError(e).into_response())
}

/// GET /
///
/// Liveness probe; never touches the store.
pub async fn get_status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}

/// GET /health
///
/// Reports the record store's health; 503 unless it is reachable.
pub async fn get_health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, detail) = match state.pipeline.store().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy", None),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            Some(e.to_string()),
        ),
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
            detail,
        }),
    )
}
