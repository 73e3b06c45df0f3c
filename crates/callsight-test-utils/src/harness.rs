// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles the full pipeline with a mock reasoning service
//! and a temp SQLite database. `analyze()` drives one request through
//! validation, extraction and persistence.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use callsight_core::{AnalysisOutcome, CallsightError, RecordStore};
use callsight_pipeline::{InsightExtractor, Pipeline, RetryPolicy};
use callsight_storage::{DatabaseLocation, PoolOptions, SqliteRecordStore};

use crate::mock_provider::{MockProvider, MockReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    max_retries: u32,
    attempt_timeout: Duration,
    pool_size: usize,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            max_retries: RetryPolicy::default().max_retries,
            attempt_timeout: Duration::from_secs(5),
            pool_size: 2,
        }
    }

    /// Set scripted reasoning-service replies.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self
    }

    /// Override the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the per-attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Build the harness: temp database, initialized store, zero-delay retries.
    pub async fn build(self) -> Result<TestHarness, CallsightError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| CallsightError::persistence("failed to create temp dir", e))?;
        let db_path = temp_dir.path().join("callsight-test.db");

        let store = Arc::new(SqliteRecordStore::with_options(
            DatabaseLocation::File(db_path.clone()),
            PoolOptions {
                size: self.pool_size,
                ..PoolOptions::default()
            },
        ));
        store.initialize().await?;

        let mock_provider = Arc::new(MockProvider::with_replies(self.replies));
        let policy = RetryPolicy {
            max_retries: self.max_retries,
            delay: Duration::ZERO,
            attempt_timeout: self.attempt_timeout,
        };
        let extractor = InsightExtractor::new(mock_provider.clone(), policy)?;
        let pipeline = Arc::new(Pipeline::new(extractor, store.clone()));

        Ok(TestHarness {
            mock_provider,
            store,
            pipeline,
            db_path,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock provider and temp storage.
pub struct TestHarness {
    /// The scripted reasoning service.
    pub mock_provider: Arc<MockProvider>,
    /// SQLite record store (temp DB, removed on drop).
    pub store: Arc<SqliteRecordStore>,
    /// The assembled pipeline.
    pub pipeline: Arc<Pipeline>,
    db_path: PathBuf,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Run one transcript through the pipeline.
    pub async fn analyze(&self, transcript: &str) -> Result<AnalysisOutcome, CallsightError> {
        self.pipeline.handle(transcript).await
    }

    /// Add a reply to the mock provider's queue.
    pub async fn add_reply(&self, reply: MockReply) {
        self.mock_provider.add_reply(reply).await;
    }

    /// Path of the temp database file.
    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }
}
