// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Callsight analysis pipeline.
//!
//! Exposes the pipeline as `POST /analyze_call` and maps each error
//! category to its own status code.

pub mod handlers;
pub mod server;

pub use handlers::{AnalyzeRequest, ApiError, ErrorResponse};
pub use server::{AppState, router, start_server};
