// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record store with switchable failures.
//!
//! `MockRecordStore` implements `RecordStore` over a `Vec`, so tests can
//! force a persistence failure without touching SQLite.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use callsight_core::CallsightError;
use callsight_core::traits::{PluginAdapter, RecordStore};
use callsight_core::types::{AdapterType, CallRecord, HealthStatus, Insight, Transcript};

/// A record store backed by a vector.
#[derive(Default)]
pub struct MockRecordStore {
    records: Mutex<Vec<CallRecord>>,
    fail_writes: AtomicBool,
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every insert fails with `Persistence`.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_fail_writes(true);
        store
    }

    /// Make subsequent inserts fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored record.
    pub async fn records(&self) -> Vec<CallRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockRecordStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CallsightError> {
        if self.is_closed() {
            return Ok(HealthStatus::Unhealthy("store closed".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CallsightError> {
        self.close().await
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn initialize(&self) -> Result<(), CallsightError> {
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn insert(
        &self,
        transcript: &Transcript,
        insight: &Insight,
    ) -> Result<CallRecord, CallsightError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CallsightError::Persistence {
                message: "mock store rejected the write".into(),
                source: None,
            });
        }

        let mut records = self.records.lock().await;
        let record = CallRecord {
            id: records.len() as i64 + 1,
            transcript: transcript.as_str().to_string(),
            intent: insight.customer_intent.clone(),
            sentiment: insight.sentiment,
            summary: insight.summary.clone(),
            action_required: insight.action_required,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn count(&self) -> Result<u64, CallsightError> {
        Ok(self.records.lock().await.len() as u64)
    }

    async fn get(&self, id: i64) -> Result<Option<CallRecord>, CallsightError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn close(&self) -> Result<(), CallsightError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use callsight_core::Sentiment;

    use super::*;

    fn insight() -> Insight {
        Insight::new("pay later", Sentiment::Neutral, true, "Customer will pay Friday.").unwrap()
    }

    #[tokio::test]
    async fn inserts_assign_sequential_ids() {
        let store = MockRecordStore::new();
        let t = Transcript::new("Agent: hi").unwrap();
        let a = store.insert(&t, &insight()).await.unwrap();
        let b = store.insert(&t, &insight()).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.get(2).await.unwrap(), Some(b));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn initialize_is_recorded_and_repeatable() {
        let store = MockRecordStore::new();
        assert!(!store.is_initialized());
        store.initialize().await.unwrap();
        store.initialize().await.unwrap();
        assert!(store.is_initialized());
    }

    #[tokio::test]
    async fn failing_store_rejects_writes() {
        let store = MockRecordStore::failing();
        let t = Transcript::new("Agent: hi").unwrap();
        let err = store.insert(&t, &insight()).await.unwrap_err();
        assert!(matches!(err, CallsightError::Persistence { .. }));
        assert_eq!(store.count().await.unwrap(), 0);

        store.set_fail_writes(false);
        assert!(store.insert(&t, &insight()).await.is_ok());
    }

    #[tokio::test]
    async fn close_reports_unhealthy() {
        let store = MockRecordStore::new();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        store.shutdown().await.unwrap();
        assert!(store.is_closed());
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
