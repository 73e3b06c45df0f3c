// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Callsight.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Callsight configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional, but `gemini.api_key` and
/// `storage.database_url` have no default and are enforced by validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CallsightConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Gemini reasoning service settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Gemini reasoning service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. Required; falls back to the `GEMINI_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for insight extraction.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout applied to each individual attempt, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite file path or `sqlite://` URL. Required; falls back to the
    /// `DATABASE_URL` env var.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Maximum wait for a free connection, in seconds.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// SQLite busy timeout applied to every connection, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool_size: default_pool_size(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            busy_timeout_ms: default_busy_timeout_ms(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_pool_size() -> usize {
    4
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_required_keys_unset() {
        let config = CallsightConfig::default();
        assert!(config.gemini.api_key.is_none());
        assert!(config.storage.database_url.is_none());
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.max_retries, 2);
        assert_eq!(config.storage.pool_size, 4);
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn partial_section_fills_remaining_defaults() {
        let config: CallsightConfig = toml::from_str(
            r#"
[gemini]
api_key = "k"
max_retries = 1
"#,
        )
        .unwrap();
        assert_eq!(config.gemini.api_key.as_deref(), Some("k"));
        assert_eq!(config.gemini.max_retries, 1);
        assert_eq!(config.gemini.retry_delay_ms, 500);
        assert_eq!(config.gemini.request_timeout_secs, 60);
    }
}
