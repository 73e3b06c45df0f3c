// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Callsight integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted reasoning service with request capture
//! - [`MockRecordStore`] - In-memory record store with injectable write failures
//! - [`TestHarness`] - Full pipeline over a temp SQLite database

pub mod harness;
pub mod mock_provider;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_provider::{MockProvider, MockReply, valid_insight_json};
pub use mock_store::MockRecordStore;
