// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini reasoning-service adapter for Callsight.
//!
//! This crate implements [`ReasoningProvider`] over the Gemini
//! `generateContent` API, requesting JSON output constrained by a response
//! schema.

pub mod client;
pub mod schema;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use callsight_config::model::GeminiConfig;
use callsight_core::error::CallsightError;
use callsight_core::traits::{PluginAdapter, ReasoningProvider};
use callsight_core::types::{
    AdapterType, HealthStatus, ReasoningRequest, ReasoningResponse, TokenUsage,
};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// Gemini provider implementing [`ReasoningProvider`].
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Creates a provider from the `[gemini]` config section.
    ///
    /// The API key must already be resolved by the config loader (it honors
    /// `GEMINI_API_KEY`); a missing key is a configuration error.
    pub fn new(config: &GeminiConfig) -> Result<Self, CallsightError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                CallsightError::Config(
                    "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
                )
            })?;
        let api_key = SecretString::from(api_key.to_string());

        let client = GeminiClient::new(
            &api_key,
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_base_url(config.base_url.clone());

        info!(model = %config.model, "Gemini provider initialized");
        Ok(Self { client })
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }

    fn to_api_request(request: &ReasoningRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Some(Content::text(&request.system_instruction)),
            contents: vec![Content::user(&request.content)],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(schema::to_gemini_schema(&request.response_schema)),
                temperature: None,
            }),
        }
    }
}

/// Pulls the answer text out of a response, rejecting empty or blocked ones.
fn extract_text(response: &GenerateContentResponse) -> Result<String, CallsightError> {
    let Some(candidate) = response.candidates.first() else {
        let message = match response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            Some(reason) => format!("prompt blocked by Gemini: {reason}"),
            None => "Gemini returned no candidates".to_string(),
        };
        return Err(CallsightError::Provider {
            message,
            source: None,
        });
    };

    let text = candidate.text();
    let finish = candidate.finish_reason.as_deref().unwrap_or("STOP");
    if text.trim().is_empty() && finish != "STOP" {
        return Err(CallsightError::Provider {
            message: format!("Gemini stopped without output: {finish}"),
            source: None,
        });
    }
    Ok(text)
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, CallsightError> {
        // Probing the API would spend quota; a built client is considered healthy.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CallsightError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ReasoningProvider for GeminiProvider {
    async fn generate(&self, request: ReasoningRequest) -> Result<ReasoningResponse, CallsightError> {
        let api_request = Self::to_api_request(&request);
        let response = self.client.generate_content(&api_request).await?;
        let text = extract_text(&response)?;

        Ok(ReasoningResponse {
            text,
            model: response
                .model_version
                .clone()
                .unwrap_or_else(|| self.client.model().to_string()),
            usage: response.usage_metadata.as_ref().map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            }),
        })
    }
}
