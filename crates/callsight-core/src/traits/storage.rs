// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for the durable audit table.

use async_trait::async_trait;

use crate::error::CallsightError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CallRecord, Insight, Transcript};

/// Adapter for the record store.
///
/// The store exclusively owns the `call_records` table. Records are written
/// once and never updated or deleted through this trait.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Creates the backing table if absent. Safe to call on every start and
    /// concurrently with itself.
    async fn initialize(&self) -> Result<(), CallsightError>;

    /// Atomically writes one record and returns it with its assigned id.
    async fn insert(
        &self,
        transcript: &Transcript,
        insight: &Insight,
    ) -> Result<CallRecord, CallsightError>;

    /// Number of persisted records.
    async fn count(&self) -> Result<u64, CallsightError>;

    /// Looks up a record by id.
    async fn get(&self, id: i64) -> Result<Option<CallRecord>, CallsightError>;

    /// Flushes pending state and releases every pooled connection.
    async fn close(&self) -> Result<(), CallsightError>;
}
