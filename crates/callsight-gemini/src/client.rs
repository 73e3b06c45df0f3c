// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Provides [`GeminiClient`] which handles authentication, request
//! construction and error decoding. It makes exactly one HTTP call per
//! request; retrying belongs to the insight extractor.

use std::time::Duration;

use callsight_core::CallsightError;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Public Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new Gemini API client.
    ///
    /// `timeout` bounds each HTTP call end to end.
    pub fn new(
        api_key: &SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CallsightError> {
        let mut key = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|e| CallsightError::Config(format!("invalid API key header value: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CallsightError::provider("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (regional endpoints, proxies, wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Sends one `generateContent` request.
    ///
    /// Non-2xx responses become [`CallsightError::Provider`] carrying the API's
    /// status and message when the error body is parseable.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, CallsightError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallsightError::provider("Gemini request timed out", e)
                } else {
                    CallsightError::provider(format!("HTTP request failed: {e}"), e)
                }
            })?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "generateContent response received");

        let body = response
            .text()
            .await
            .map_err(|e| CallsightError::provider(format!("failed to read response body: {e}"), e))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error {} ({}): {}",
                    status.as_u16(),
                    api_err.error.status,
                    api_err.error.message
                ),
                Err(_) => format!("Gemini API returned {status}: {body}"),
            };
            return Err(CallsightError::Provider {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| CallsightError::provider(format!("failed to parse API response: {e}"), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Content;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new(
            &SecretString::from("test-api-key".to_string()),
            "gemini-2.5-flash",
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(base_url)
    }

    fn test_request() -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Some(Content::text("system")),
            contents: vec![Content::user("Hello")],
            generation_config: None,
        }
    }

    #[tokio::test]
    async fn generate_content_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{}"}]},
                    "finishReason": "STOP"
                }],
                "modelVersion": "gemini-2.5-flash"
            })))
            .mount(&server)
            .await;

        let response = test_client(&server.uri())
            .generate_content(&test_request())
            .await
            .unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].text(), "{}");
    }

    #[tokio::test]
    async fn client_sends_key_header_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .generate_content(&test_request())
            .await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn api_error_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate_content(&test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("INVALID_ARGUMENT"), "got: {err}");
        assert!(err.contains("API key not valid"), "got: {err}");
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate_content(&test_request())
            .await
            .unwrap_err();
        assert!(matches!(err, CallsightError::Provider { .. }));
        assert!(err.to_string().contains("503"), "got: {err}");
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"candidates": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(
            &SecretString::from("k".to_string()),
            "gemini-2.5-flash",
            Duration::from_millis(50),
        )
        .unwrap()
        .with_base_url(server.uri());
        let err = client.generate_content(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }
}
