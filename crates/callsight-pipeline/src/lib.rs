// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript analysis pipeline for Callsight.
//!
//! ## Architecture
//!
//! - **InsightExtractor**: schema-constrained reasoning call with bounded retries
//! - **Pipeline**: validate, extract, persist; one record per successful request
//! - **prompt / schema**: the fixed instruction and the insight contract

pub mod extractor;
pub mod pipeline;
pub mod prompt;
pub mod schema;

pub use extractor::{InsightExtractor, RetryPolicy, parse_insight};
pub use pipeline::{Pipeline, PipelineStage};
