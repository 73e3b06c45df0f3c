// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Callsight analysis pipeline.

use std::time::Duration;

use thiserror::Error;

/// Boxed error source carried by provider and storage failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Callsight crates.
///
/// `Validation`, `Extraction` and `Persistence` are the three terminal
/// outcomes a pipeline run can fail with. `Provider`, `InvalidOutput` and
/// `Timeout` describe a single failed attempt against the reasoning service
/// and are folded into `Extraction` once the retry budget is spent.
#[derive(Debug, Error)]
pub enum CallsightError {
    /// Caller input rejected before any external call (empty transcript).
    #[error("validation error: {0}")]
    Validation(String),

    /// The reasoning service could not produce a valid insight.
    #[error("extraction failed after {attempts} attempt(s): {message}")]
    Extraction {
        attempts: u32,
        message: String,
        source: Option<BoxError>,
    },

    /// The record store rejected or could not complete a write.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<BoxError>,
    },

    /// Configuration errors (missing credential, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Reasoning service transport or API failure for one attempt.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<BoxError>,
    },

    /// Reasoning service output did not satisfy the insight schema.
    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse failure category a transport layer maps to a status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent unusable input.
    ClientInput,
    /// The external reasoning service failed.
    Service,
    /// The record store failed.
    Storage,
    /// Anything else.
    Internal,
}

impl CallsightError {
    /// Builds a `Persistence` error from any storage-layer failure.
    pub fn persistence(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a `Provider` error from any transport-layer failure.
    pub fn provider(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Provider {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the category used by the transport layer.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::ClientInput,
            Self::Extraction { .. }
            | Self::Provider { .. }
            | Self::InvalidOutput(_)
            | Self::Timeout { .. } => ErrorCategory::Service,
            Self::Persistence { .. } => ErrorCategory::Storage,
            Self::Config(_) | Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_kinds_map_to_distinct_categories() {
        let validation = CallsightError::Validation("empty".into());
        let extraction = CallsightError::Extraction {
            attempts: 3,
            message: "boom".into(),
            source: None,
        };
        let persistence = CallsightError::Persistence {
            message: "disk full".into(),
            source: None,
        };

        assert_eq!(validation.category(), ErrorCategory::ClientInput);
        assert_eq!(extraction.category(), ErrorCategory::Service);
        assert_eq!(persistence.category(), ErrorCategory::Storage);
    }

    #[test]
    fn attempt_failures_are_service_failures() {
        let timeout = CallsightError::Timeout {
            duration: Duration::from_secs(30),
        };
        assert_eq!(timeout.category(), ErrorCategory::Service);
        assert_eq!(
            CallsightError::InvalidOutput("missing field".into()).category(),
            ErrorCategory::Service
        );
    }

    #[test]
    fn extraction_message_names_attempts_and_reason() {
        let err = CallsightError::Extraction {
            attempts: 3,
            message: "invalid model output: missing field `summary`".into(),
            source: None,
        };
        let text = err.to_string();
        assert!(text.contains("3 attempt(s)"), "got: {text}");
        assert!(text.contains("summary"), "got: {text}");
    }

    #[test]
    fn persistence_helper_keeps_source() {
        let err = CallsightError::persistence("write rejected", std::io::Error::other("locked"));
        match err {
            CallsightError::Persistence { message, source } => {
                assert_eq!(message, "write rejected");
                assert_eq!(source.unwrap().to_string(), "locked");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
