// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite record store for Callsight.
//!
//! Provides the `call_records` audit table behind a fixed-size pool of
//! `tokio-rusqlite` connections opened with WAL journaling and a busy
//! timeout. Every insert is one IMMEDIATE transaction.

pub mod adapter;
pub mod database;
pub mod pool;
pub mod queries;
pub mod schema;

pub use adapter::SqliteRecordStore;
pub use database::{ConnectionOptions, DatabaseLocation};
pub use pool::{ConnectionPool, PoolOptions, PooledConnection};
