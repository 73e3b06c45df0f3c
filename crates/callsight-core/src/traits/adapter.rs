// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by the reasoning provider and the record store.

use async_trait::async_trait;

use crate::error::CallsightError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Callsight adapters.
///
/// Provides identity, health checking, and shutdown for every backend the
/// pipeline talks to.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, CallsightError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), CallsightError>;
}
