// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reasoning service for deterministic testing.
//!
//! `MockProvider` implements `ReasoningProvider` with scripted replies,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use callsight_core::CallsightError;
use callsight_core::traits::{PluginAdapter, ReasoningProvider};
use callsight_core::types::{
    AdapterType, HealthStatus, ReasoningRequest, ReasoningResponse, TokenUsage,
};

/// Model name reported in every mock response.
pub const MOCK_MODEL: &str = "mock-reasoner";

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw response text, returned as-is.
    Text(String),
    /// A transport-level failure for this attempt.
    Error(String),
    /// Wait before producing the inner reply.
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn delayed(delay: Duration, reply: MockReply) -> Self {
        Self::Delayed(delay, Box::new(reply))
    }
}

/// A well-formed insight reply.
pub fn valid_insight_json(intent: &str, sentiment: &str, action_required: bool, summary: &str) -> String {
    serde_json::json!({
        "customer_intent": intent,
        "sentiment": sentiment,
        "action_required": action_required,
        "summary": summary,
    })
    .to_string()
}

fn default_reply() -> String {
    valid_insight_json(
        "General inquiry",
        "neutral",
        false,
        "Customer asked a general question and the agent answered it.",
    )
}

/// A mock reasoning service that returns scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty, a default
/// valid insight is returned. Every request is recorded.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ReasoningRequest>>>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    /// Create a mock provider pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a reply to the end of the queue.
    pub async fn add_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub async fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(default_reply()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, CallsightError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CallsightError> {
        Ok(())
    }
}

#[async_trait]
impl ReasoningProvider for MockProvider {
    async fn generate(
        &self,
        request: ReasoningRequest,
    ) -> Result<ReasoningResponse, CallsightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request);

        let mut reply = self.next_reply().await;
        loop {
            match reply {
                MockReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                MockReply::Text(text) => {
                    return Ok(ReasoningResponse {
                        text,
                        model: MOCK_MODEL.to_string(),
                        usage: Some(TokenUsage {
                            input_tokens: 10,
                            output_tokens: 20,
                        }),
                    });
                }
                MockReply::Error(message) => {
                    return Err(CallsightError::Provider {
                        message,
                        source: None,
                    });
                }
            }
        }
    }
}
