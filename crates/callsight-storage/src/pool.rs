// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size pool of `tokio-rusqlite` connections.
//!
//! Each connection owns its own background thread, so up to `size` queries
//! run in parallel. SQLite serializes writers at the file level; the
//! `busy_timeout` PRAGMA makes a blocked writer wait instead of failing.

use std::ops::Deref;
use std::sync::Mutex;
use std::time::Duration;

use callsight_core::CallsightError;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::database::{ConnectionOptions, DatabaseLocation, open_connection};

/// Pool sizing and connection settings.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    pub size: usize,
    pub acquire_timeout: Duration,
    pub connection: ConnectionOptions,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            size: 4,
            acquire_timeout: Duration::from_secs(5),
            connection: ConnectionOptions::default(),
        }
    }
}

/// A bounded set of reusable connections.
///
/// [`ConnectionPool::acquire`] hands out a [`PooledConnection`] guard that puts
/// the connection back when dropped, whether the caller succeeded or not.
pub struct ConnectionPool {
    idle: Mutex<Vec<Connection>>,
    permits: Semaphore,
    size: usize,
    acquire_timeout: Duration,
    location: DatabaseLocation,
}

impl ConnectionPool {
    /// Opens every connection up front.
    ///
    /// In-memory databases are private to one connection, so they always get
    /// a pool of exactly one.
    pub async fn open(
        location: DatabaseLocation,
        options: PoolOptions,
    ) -> Result<Self, CallsightError> {
        let size = match location {
            DatabaseLocation::Memory => 1,
            DatabaseLocation::File(_) => options.size.max(1),
        };

        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            connections.push(open_connection(&location, options.connection).await?);
        }
        debug!(%location, size, "connection pool opened");

        Ok(Self {
            idle: Mutex::new(connections),
            permits: Semaphore::new(size),
            size,
            acquire_timeout: options.acquire_timeout,
            location,
        })
    }

    /// Waits for a free connection, up to the configured acquire timeout.
    pub async fn acquire(&self) -> Result<PooledConnection<'_>, CallsightError> {
        let permit = match tokio::time::timeout(self.acquire_timeout, self.permits.acquire()).await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(CallsightError::Persistence {
                    message: "connection pool is closed".to_string(),
                    source: None,
                });
            }
            Err(_) => {
                warn!(
                    size = self.size,
                    timeout_ms = self.acquire_timeout.as_millis() as u64,
                    "connection pool exhausted"
                );
                return Err(CallsightError::Persistence {
                    message: format!(
                        "connection pool exhausted: no connection free within {:?}",
                        self.acquire_timeout
                    ),
                    source: None,
                });
            }
        };

        // A permit guarantees a parked connection.
        let conn = self.lock_idle().pop().ok_or_else(|| {
            CallsightError::Internal("pool permit granted with no idle connection".to_string())
        })?;

        Ok(PooledConnection {
            conn,
            pool: self,
            _permit: permit,
        })
    }

    /// Number of connections managed by the pool.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Connections currently parked and free to hand out.
    pub fn idle(&self) -> usize {
        self.lock_idle().len()
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    /// Stops handing out connections and closes every idle one.
    ///
    /// Waits for outstanding guards to come back first, so no connection is
    /// closed underneath a running query.
    pub async fn close(&self) -> Result<(), CallsightError> {
        let permits = u32::try_from(self.size)
            .map_err(|_| CallsightError::Internal("pool size exceeds u32".to_string()))?;
        let all = tokio::time::timeout(self.acquire_timeout, self.permits.acquire_many(permits))
            .await
            .map_err(|_| CallsightError::Persistence {
                message: "timed out waiting for pooled connections to be released".to_string(),
                source: None,
            })?
            .map_err(|_| CallsightError::Persistence {
                message: "connection pool is already closed".to_string(),
                source: None,
            })?;
        self.permits.close();
        all.forget();

        let connections: Vec<Connection> = self.lock_idle().drain(..).collect();
        for conn in connections {
            if let Err(e) = conn.close().await {
                warn!(error = %e, "failed to close pooled connection");
            }
        }
        debug!(location = %self.location, "connection pool closed");
        Ok(())
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<Connection>> {
        // The guarded Vec is never left half-updated, so a poisoned lock is still usable.
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A connection checked out of a [`ConnectionPool`].
///
/// Dereferences to the underlying `tokio_rusqlite::Connection`.
pub struct PooledConnection<'a> {
    conn: Connection,
    pool: &'a ConnectionPool,
    _permit: SemaphorePermit<'a>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        // Connection is a handle to the worker thread; parking a clone keeps
        // the same SQLite connection. Park before the permit field drops so
        // the next waiter finds it.
        self.pool.lock_idle().push(self.conn.clone());
    }
}
