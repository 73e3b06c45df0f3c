// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reasoning provider trait for the external language-understanding service.

use async_trait::async_trait;

use crate::error::CallsightError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ReasoningRequest, ReasoningResponse};

/// Adapter for the external reasoning service.
///
/// One call is one attempt: implementations must not retry internally and
/// must not cache. Failures are reported as [`CallsightError::Provider`] or
/// [`CallsightError::Timeout`]; the caller owns the retry policy.
#[async_trait]
pub trait ReasoningProvider: PluginAdapter {
    /// Sends a schema-constrained generation request and returns the raw output.
    async fn generate(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningResponse, CallsightError>;
}
