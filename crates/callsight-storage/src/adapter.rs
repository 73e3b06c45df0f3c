// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RecordStore trait.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use callsight_config::model::StorageConfig;
use callsight_core::{
    AdapterType, CallRecord, CallsightError, HealthStatus, Insight, PluginAdapter, RecordStore,
    Transcript,
};

use crate::database::{ConnectionOptions, DatabaseLocation, map_tr_err};
use crate::pool::{ConnectionPool, PoolOptions};
use crate::queries;
use crate::schema::ensure_schema;

/// SQLite-backed record store.
///
/// The pool is opened lazily by the first [`RecordStore::initialize`] call;
/// concurrent or repeated calls share that one pool and re-run the
/// idempotent schema statement.
pub struct SqliteRecordStore {
    location: DatabaseLocation,
    options: PoolOptions,
    pool: OnceCell<ConnectionPool>,
}

impl SqliteRecordStore {
    /// Create a store from the `[storage]` config section.
    ///
    /// No connection is opened until [`RecordStore::initialize`] is called.
    pub fn new(config: &StorageConfig) -> Result<Self, CallsightError> {
        let url = config.database_url.as_deref().ok_or_else(|| {
            CallsightError::Config("storage.database_url is not set".to_string())
        })?;
        Ok(Self::with_options(
            DatabaseLocation::parse(url)?,
            PoolOptions {
                size: config.pool_size,
                acquire_timeout: Duration::from_secs(config.acquire_timeout_secs),
                connection: ConnectionOptions {
                    busy_timeout: Duration::from_millis(config.busy_timeout_ms),
                    wal_mode: config.wal_mode,
                },
            },
        ))
    }

    /// Create a store with explicit pool options.
    pub fn with_options(location: DatabaseLocation, options: PoolOptions) -> Self {
        Self {
            location,
            options,
            pool: OnceCell::new(),
        }
    }

    /// The connection pool, or an error before `initialize`.
    pub fn pool(&self) -> Result<&ConnectionPool, CallsightError> {
        self.pool.get().ok_or_else(|| CallsightError::Persistence {
            message: "record store not initialized -- call initialize() first".to_string(),
            source: None,
        })
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    async fn checkpoint(pool: &ConnectionPool) -> Result<(), CallsightError> {
        let conn = pool.acquire().await?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
    }
}

#[async_trait]
impl PluginAdapter for SqliteRecordStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CallsightError> {
        let pool = self.pool()?;
        let conn = pool.acquire().await?;
        let probe = conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), CallsightError> {
        if self.pool.get().is_some() {
            self.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn initialize(&self) -> Result<(), CallsightError> {
        let pool = self
            .pool
            .get_or_try_init(|| ConnectionPool::open(self.location.clone(), self.options))
            .await?;

        let conn = pool.acquire().await?;
        conn.call(|conn| ensure_schema(conn))
            .await
            .map_err(map_tr_err)?;
        info!(location = %self.location, pool_size = pool.size(), "record store initialized");
        Ok(())
    }

    async fn insert(
        &self,
        transcript: &Transcript,
        insight: &Insight,
    ) -> Result<CallRecord, CallsightError> {
        queries::call_records::insert_record(self.pool()?, transcript, insight).await
    }

    async fn count(&self) -> Result<u64, CallsightError> {
        queries::call_records::count_records(self.pool()?).await
    }

    async fn get(&self, id: i64) -> Result<Option<CallRecord>, CallsightError> {
        queries::call_records::get_record(self.pool()?, id).await
    }

    async fn close(&self) -> Result<(), CallsightError> {
        let pool = self.pool()?;
        if self.options.connection.wal_mode && self.location.path().is_some() {
            Self::checkpoint(pool).await?;
            debug!("WAL checkpoint complete");
        }
        pool.close().await
    }
}
