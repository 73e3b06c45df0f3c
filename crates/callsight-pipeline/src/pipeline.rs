// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request orchestration: validate, extract, persist.

use std::sync::Arc;

use callsight_core::{AnalysisOutcome, CallsightError, RecordStore, Transcript};
use strum::Display;
use tracing::{Instrument, Span, debug, error, info, info_span};
use uuid::Uuid;

use crate::extractor::InsightExtractor;

/// Where a request is in its lifecycle.
///
/// `Received -> Validating -> Extracting -> Persisting -> Completed`; any
/// non-terminal stage can move to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Validating,
    Extracting,
    Persisting,
    Completed,
    Failed(String),
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

/// Per-request stage holder. Lives for one `handle` call only.
struct StageTracker {
    stage: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        debug!(stage = %PipelineStage::Received, "pipeline stage");
        Self {
            stage: PipelineStage::Received,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!(from = %self.stage, to = %next, "pipeline stage");
        self.stage = next;
    }

    /// Moves to `Failed`, logging the stage the failure happened in.
    fn fail(&mut self, err: CallsightError) -> CallsightError {
        if !self.stage.is_terminal() {
            error!(stage = %self.stage, error = %err, "analysis failed");
            self.stage = PipelineStage::Failed(err.to_string());
        }
        err
    }
}

/// Composes the insight extractor and the record store.
///
/// Holds no per-request state; share it as `Arc<Pipeline>` across tasks.
pub struct Pipeline {
    extractor: InsightExtractor,
    store: Arc<dyn RecordStore>,
}

impl Pipeline {
    pub fn new(extractor: InsightExtractor, store: Arc<dyn RecordStore>) -> Self {
        Self { extractor, store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Analyze and persist one transcript.
    ///
    /// Empty or whitespace-only input fails with `Validation` before the
    /// reasoning service is called. An `Extraction` failure persists
    /// nothing. A `Persistence` failure loses the extracted insight.
    pub async fn handle(&self, raw: &str) -> Result<AnalysisOutcome, CallsightError> {
        let span = info_span!(
            "analyze_call",
            request_id = %Uuid::new_v4(),
            transcript_len = tracing::field::Empty
        );
        self.run(raw).instrument(span).await
    }

    async fn run(&self, raw: &str) -> Result<AnalysisOutcome, CallsightError> {
        let mut tracker = StageTracker::new();

        tracker.advance(PipelineStage::Validating);
        let transcript = Transcript::new(raw).map_err(|e| tracker.fail(e))?;
        Span::current().record("transcript_len", transcript.len());

        tracker.advance(PipelineStage::Extracting);
        let insight = self
            .extractor
            .analyze(&transcript)
            .await
            .map_err(|e| tracker.fail(e))?;

        tracker.advance(PipelineStage::Persisting);
        let record = self
            .store
            .insert(&transcript, &insight)
            .await
            .map_err(|e| tracker.fail(e))?;

        tracker.advance(PipelineStage::Completed);
        info!(
            record_id = record.id,
            sentiment = %insight.sentiment,
            action_required = insight.action_required,
            "call analyzed"
        );

        Ok(AnalysisOutcome {
            record_id: record.id,
            insights: insight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels() {
        assert_eq!(PipelineStage::Received.to_string(), "received");
        assert_eq!(PipelineStage::Persisting.to_string(), "persisting");
        assert!(PipelineStage::Completed.is_terminal());
        assert!(PipelineStage::Failed("x".into()).is_terminal());
        assert!(!PipelineStage::Extracting.is_terminal());
    }

    #[test]
    fn tracker_records_failure_once() {
        let mut tracker = StageTracker::new();
        tracker.advance(PipelineStage::Extracting);
        let _ = tracker.fail(CallsightError::InvalidOutput("bad".into()));
        assert!(matches!(tracker.stage, PipelineStage::Failed(ref m) if m.contains("bad")));

        let _ = tracker.fail(CallsightError::Internal("later".into()));
        assert!(matches!(tracker.stage, PipelineStage::Failed(ref m) if m.contains("bad")));
    }
}
