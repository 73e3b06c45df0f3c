// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema-constrained insight extraction with bounded retries.
//!
//! Every attempt sends the fixed system instruction plus the transcript,
//! then checks the reply against the insight schema. Transport errors,
//! timeouts, and schema violations are all retried the same way; once the
//! attempt budget is spent the last reason is surfaced as
//! [`CallsightError::Extraction`].

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use callsight_config::model::GeminiConfig;
use callsight_core::error::CallsightError;
use callsight_core::traits::ReasoningProvider;
use callsight_core::types::{Insight, ReasoningRequest, Sentiment, Transcript};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::prompt::SYSTEM_INSTRUCTION;
use crate::schema::{insight_validator, response_schema};

/// Retry budget and per-attempt timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
    /// Upper bound on a single attempt, response parsing included.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(500),
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay_ms),
            attempt_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Total attempts, the first one included.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Raw reply shape, before sentiment normalization and blank checks.
#[derive(Debug, Deserialize)]
struct RawInsight {
    customer_intent: String,
    sentiment: String,
    action_required: bool,
    summary: String,
}

/// Turns a transcript into a validated [`Insight`].
pub struct InsightExtractor {
    provider: Arc<dyn ReasoningProvider>,
    policy: RetryPolicy,
    validator: jsonschema::Validator,
    response_schema: serde_json::Value,
}

impl InsightExtractor {
    pub fn new(
        provider: Arc<dyn ReasoningProvider>,
        policy: RetryPolicy,
    ) -> Result<Self, CallsightError> {
        Ok(Self {
            provider,
            policy,
            validator: insight_validator()?,
            response_schema: response_schema(),
        })
    }

    /// Analyze one transcript.
    ///
    /// Makes up to `max_retries + 1` calls to the reasoning service. Nothing
    /// is cached: the same transcript is sent again on every invocation.
    pub async fn analyze(&self, transcript: &Transcript) -> Result<Insight, CallsightError> {
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            if attempt > 1 && !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }

            match self.attempt(transcript).await {
                Ok(insight) => {
                    debug!(attempt, sentiment = %insight.sentiment, "insight extracted");
                    return Ok(insight);
                }
                Err(e) => {
                    warn!(attempt, of = attempts, error = %e, "insight extraction attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .unwrap_or_else(|| CallsightError::Internal("no extraction attempt was made".into()));
        error!(attempts, error = %last, "insight extraction failed on every attempt");
        Err(CallsightError::Extraction {
            attempts,
            message: last.to_string(),
            source: Some(Box::new(last)),
        })
    }

    async fn attempt(&self, transcript: &Transcript) -> Result<Insight, CallsightError> {
        let request = ReasoningRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            content: transcript.as_str().to_string(),
            response_schema: self.response_schema.clone(),
        };

        let timeout = self.policy.attempt_timeout;
        let response = tokio::time::timeout(timeout, self.provider.generate(request))
            .await
            .map_err(|_| CallsightError::Timeout { duration: timeout })??;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "reasoning service replied"
            );
        }

        parse_insight(&response.text, &self.validator)
    }
}

/// Validate a raw reply and build an [`Insight`] from it.
///
/// Accepts a reply wrapped in a markdown code fence. Any deviation from the
/// schema is an [`CallsightError::InvalidOutput`].
pub fn parse_insight(
    text: &str,
    validator: &jsonschema::Validator,
) -> Result<Insight, CallsightError> {
    let body = strip_code_fence(text);
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| CallsightError::InvalidOutput(format!("reply is not valid JSON: {e}")))?;

    let violations: Vec<String> = validator.iter_errors(&value).map(|e| e.to_string()).collect();
    if !violations.is_empty() {
        return Err(CallsightError::InvalidOutput(format!(
            "reply violates the insight schema: {}",
            violations.join("; ")
        )));
    }

    let raw: RawInsight = serde_json::from_value(value)
        .map_err(|e| CallsightError::InvalidOutput(format!("reply has the wrong shape: {e}")))?;
    let sentiment = Sentiment::from_str(raw.sentiment.trim()).map_err(|_| {
        CallsightError::InvalidOutput(format!(
            "sentiment `{}` is not one of positive, neutral, negative",
            raw.sentiment
        ))
    })?;

    Insight::new(raw.customer_intent, sentiment, raw.action_required, raw.summary)
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) up to the first newline.
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> jsonschema::Validator {
        insight_validator().unwrap()
    }

    const VALID: &str = r#"{"customer_intent":"Confirm EMI payment","sentiment":"Positive","action_required":false,"summary":"Customer confirmed timely EMI payment."}"#;

    #[test]
    fn parses_valid_reply_and_normalizes_sentiment() {
        let insight = parse_insight(VALID, &validator()).unwrap();
        assert_eq!(insight.customer_intent, "Confirm EMI payment");
        assert_eq!(insight.sentiment, Sentiment::Positive);
        assert!(!insight.action_required);
        assert_eq!(insight.summary, "Customer confirmed timely EMI payment.");
    }

    #[test]
    fn all_sentiment_casings_normalize_alike() {
        for casing in ["POSITIVE", "positive", "Positive", " positive "] {
            let reply = VALID.replace("\"Positive\"", &format!("\"{casing}\""));
            let insight = parse_insight(&reply, &validator()).unwrap();
            assert_eq!(insight.sentiment, Sentiment::Positive, "casing {casing:?}");
        }
    }

    #[test]
    fn code_fenced_reply_is_unwrapped() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_insight(&fenced, &validator()).is_ok());
        let bare_fence = format!("```\n{VALID}\n```\n");
        assert!(parse_insight(&bare_fence, &validator()).is_ok());
    }

    #[test]
    fn sentiment_outside_enum_is_invalid_output() {
        let reply = VALID.replace("Positive", "ecstatic");
        let err = parse_insight(&reply, &validator()).unwrap_err();
        assert!(matches!(err, CallsightError::InvalidOutput(_)), "got {err:?}");
        assert!(err.to_string().contains("ecstatic"));
    }

    #[test]
    fn missing_field_is_invalid_output() {
        let reply = r#"{"customer_intent":"x","sentiment":"neutral","summary":"y"}"#;
        let err = parse_insight(reply, &validator()).unwrap_err();
        assert!(err.to_string().contains("action_required"), "got: {err}");
    }

    #[test]
    fn wrong_type_is_invalid_output() {
        let reply = VALID.replace("false", "\"no\"");
        assert!(matches!(
            parse_insight(&reply, &validator()),
            Err(CallsightError::InvalidOutput(_))
        ));
    }

    #[test]
    fn blank_text_fields_are_invalid_output() {
        let reply = VALID.replace("Confirm EMI payment", "   ");
        assert!(matches!(
            parse_insight(&reply, &validator()),
            Err(CallsightError::InvalidOutput(_))
        ));
    }

    #[test]
    fn prose_reply_is_invalid_output() {
        let err = parse_insight("Sure! Here is the analysis.", &validator()).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn policy_counts_first_attempt() {
        assert_eq!(RetryPolicy::default().attempts(), 3);
        let none = RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(none.attempts(), 1);
    }

    #[test]
    fn policy_reads_gemini_config() {
        let config = GeminiConfig {
            max_retries: 4,
            retry_delay_ms: 0,
            request_timeout_secs: 9,
            ..GeminiConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.attempts(), 5);
        assert!(policy.delay.is_zero());
        assert_eq!(policy.attempt_timeout, Duration::from_secs(9));
    }
}
