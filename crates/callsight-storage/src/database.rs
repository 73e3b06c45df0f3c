// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection setup: URL parsing, per-connection PRAGMAs, and error mapping.

use std::path::{Path, PathBuf};
use std::time::Duration;

use callsight_core::CallsightError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A file on disk, created if absent.
    File(PathBuf),
    /// A private in-memory database (one connection only).
    Memory,
}

impl DatabaseLocation {
    /// Parses a store connection string.
    ///
    /// Accepts a bare path, `sqlite://PATH`, `sqlite:PATH`, `:memory:` and
    /// `sqlite::memory:`. Query strings (`?mode=rwc`) are ignored. Any other
    /// `scheme://` URL is rejected; the credentials it may carry are not echoed.
    pub fn parse(url: &str) -> Result<Self, CallsightError> {
        let url = url.trim();
        if let Some((scheme, _)) = url.split_once("://") {
            if !scheme.eq_ignore_ascii_case("sqlite") {
                return Err(CallsightError::Config(format!(
                    "database url scheme `{scheme}` is not supported; use a SQLite path or sqlite:// URL"
                )));
            }
        }
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        let rest = rest.split('?').next().unwrap_or_default();

        if rest.is_empty() {
            return Err(CallsightError::Config(format!(
                "database url `{url}` does not name a database"
            )));
        }
        if rest == ":memory:" {
            return Ok(Self::Memory);
        }
        Ok(Self::File(PathBuf::from(rest)))
    }

    /// Path on disk, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Memory => None,
        }
    }
}

impl std::fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => f.write_str(":memory:"),
        }
    }
}

/// PRAGMA settings applied to every pooled connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
    pub wal_mode: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            wal_mode: true,
        }
    }
}

/// Opens one connection and applies the standard PRAGMAs.
pub async fn open_connection(
    location: &DatabaseLocation,
    options: ConnectionOptions,
) -> Result<Connection, CallsightError> {
    let conn = match location {
        DatabaseLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CallsightError::persistence(
                        format!("cannot create database directory {}", parent.display()),
                        e,
                    )
                })?;
            }
            Connection::open(path).await
        }
        DatabaseLocation::Memory => Connection::open_in_memory().await,
    }
    .map_err(|e| CallsightError::persistence(format!("cannot open database {location}"), e))?;

    let busy_ms = options.busy_timeout.as_millis();
    let journal = if options.wal_mode { "WAL" } else { "DELETE" };
    conn.call(move |conn| -> Result<(), rusqlite::Error> {
        // busy_timeout first so the journal switch itself waits on a locked file.
        conn.execute_batch(&format!("PRAGMA busy_timeout = {busy_ms};"))?;
        conn.query_row(&format!("PRAGMA journal_mode = {journal};"), [], |_| Ok(()))?;
        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    })
    .await
    .map_err(map_tr_err)?;

    debug!(%location, journal, busy_ms = busy_ms as u64, "connection opened");
    Ok(conn)
}

/// Maps a tokio-rusqlite failure onto a persistence error.
pub fn map_tr_err(err: tokio_rusqlite::Error<rusqlite::Error>) -> CallsightError {
    match err {
        tokio_rusqlite::Error::Error(e) => CallsightError::persistence(e.to_string(), e),
        other => CallsightError::Persistence {
            message: other.to_string(),
            source: None,
        },
    }
}
