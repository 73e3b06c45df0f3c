// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Callsight insight pipeline.
//!
//! This crate provides the error taxonomy, the domain types (transcripts,
//! insights, call records) and the adapter traits the pipeline is built on.
//! The reasoning provider and record store crates implement traits defined
//! here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CallsightError, ErrorCategory};
pub use types::{
    AdapterType, AnalysisOutcome, CallRecord, HealthStatus, Insight, Sentiment, Transcript,
};

pub use traits::{PluginAdapter, ReasoningProvider, RecordStore};
