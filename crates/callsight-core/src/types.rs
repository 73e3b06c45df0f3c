// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Callsight workspace.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::error::CallsightError;

/// Health status reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    /// External reasoning service.
    Provider,
    /// Record store backend.
    Storage,
}

// --- Pipeline values ---

/// The dialogue of one call, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript(String);

impl Transcript {
    /// Validates and wraps raw transcript text.
    ///
    /// Surrounding whitespace is trimmed. Empty or whitespace-only input is
    /// rejected with [`CallsightError::Validation`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CallsightError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CallsightError::Validation(
                "transcript cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the transcript text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the transcript in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the text is empty. Never true for a value built by [`Transcript::new`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Transcript {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Customer sentiment over the call.
///
/// Parsing is case-insensitive; the canonical form is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, JsonSchema)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// All canonical values, in the order they are declared to the model.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Canonical lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Sentiment::from_str(raw.trim()).map_err(|_| {
            serde::de::Error::custom(format!(
                "unknown sentiment `{raw}`, expected one of: positive, neutral, negative"
            ))
        })
    }
}

/// Structured insight extracted from one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Insight {
    /// What the customer wants, in a short phrase.
    pub customer_intent: String,
    /// Overall customer sentiment.
    pub sentiment: Sentiment,
    /// Whether any follow-up is needed.
    pub action_required: bool,
    /// Two to four factual sentences about the call.
    pub summary: String,
}

impl Insight {
    /// Builds an insight, rejecting blank text fields.
    pub fn new(
        customer_intent: impl Into<String>,
        sentiment: Sentiment,
        action_required: bool,
        summary: impl Into<String>,
    ) -> Result<Self, CallsightError> {
        let customer_intent = customer_intent.into().trim().to_string();
        let summary = summary.into().trim().to_string();
        if customer_intent.is_empty() {
            return Err(CallsightError::InvalidOutput(
                "customer_intent must not be empty".to_string(),
            ));
        }
        if summary.is_empty() {
            return Err(CallsightError::InvalidOutput(
                "summary must not be empty".to_string(),
            ));
        }
        Ok(Self {
            customer_intent,
            sentiment,
            action_required,
            summary,
        })
    }
}

/// A persisted transcript together with its insight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Store-assigned, strictly increasing identifier.
    pub id: i64,
    pub transcript: String,
    pub intent: String,
    pub sentiment: Sentiment,
    pub summary: String,
    pub action_required: bool,
    /// RFC 3339 UTC timestamp assigned by the store.
    pub created_at: String,
}

impl CallRecord {
    /// Reassembles the insight stored in this record.
    pub fn insight(&self) -> Insight {
        Insight {
            customer_intent: self.intent.clone(),
            sentiment: self.sentiment,
            action_required: self.action_required,
            summary: self.summary.clone(),
        }
    }
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub record_id: i64,
    pub insights: Insight,
}

// --- Reasoning service types ---

/// A request to the external reasoning service.
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    /// Fixed role and schema instruction.
    pub system_instruction: String,
    /// The transcript text, the only variable content.
    pub content: String,
    /// JSON Schema the output must conform to.
    pub response_schema: serde_json::Value,
}

/// Raw structured output returned by the reasoning service.
#[derive(Debug, Clone)]
pub struct ReasoningResponse {
    /// Response text, expected to be a JSON document.
    pub text: String,
    /// Model that produced the response.
    pub model: String,
    /// Token accounting, when the service reports it.
    pub usage: Option<TokenUsage>,
}

/// Token usage reported by the reasoning service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
