// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Enforces the keys that have no default (reasoning-service credential and
//! store connection string) and semantic constraints serde cannot express.

use crate::diagnostic::ConfigError;
use crate::model::CallsightConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Upper bound on `gemini.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CallsightConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if is_blank(config.gemini.api_key.as_deref()) {
        errors.push(ConfigError::MissingKey {
            key: "gemini.api_key".to_string(),
            env: "GEMINI_API_KEY".to_string(),
        });
    }

    if is_blank(config.storage.database_url.as_deref()) {
        errors.push(ConfigError::MissingKey {
            key: "storage.database_url".to_string(),
            env: "DATABASE_URL".to_string(),
        });
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gemini.model must not be empty".to_string(),
        });
    }

    let base_url = config.gemini.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("gemini.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if config.gemini.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "gemini.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.gemini.max_retries > MAX_RETRIES_LIMIT {
        errors.push(ConfigError::Validation {
            message: format!(
                "gemini.max_retries must be at most {MAX_RETRIES_LIMIT}, got {}",
                config.gemini.max_retries
            ),
        });
    }

    if config.storage.pool_size == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.pool_size must be at least 1".to_string(),
        });
    }

    if config.storage.acquire_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "storage.acquire_timeout_secs must be at least 1".to_string(),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::Validation {
            message: "gateway.port must not be 0".to_string(),
        });
    }

    let level = config.service.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` is not one of: {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> CallsightConfig {
        let mut config = CallsightConfig::default();
        config.gemini.api_key = Some("test-key".to_string());
        config.storage.database_url = Some("/tmp/callsight.db".to_string());
        config
    }

    #[test]
    fn complete_config_validates() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn defaults_fail_on_both_required_keys() {
        let errors = validate_config(&CallsightConfig::default()).unwrap_err();
        let missing: Vec<&str> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::MissingKey { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(missing, vec!["gemini.api_key", "storage.database_url"]);
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let mut config = valid_config();
        config.gemini.api_key = Some("   ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingKey { key, .. } if key == "gemini.api_key")));
    }

    #[test]
    fn zero_pool_size_fails_validation() {
        let mut config = valid_config();
        config.storage.pool_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("pool_size"))));
    }

    #[test]
    fn unbounded_retries_are_rejected() {
        let mut config = valid_config();
        config.gemini.max_retries = 50;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("max_retries"))));
    }

    #[test]
    fn zero_retries_is_allowed() {
        let mut config = valid_config();
        config.gemini.max_retries = 0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = CallsightConfig::default();
        config.gemini.request_timeout_secs = 0;
        config.gateway.port = 0;
        config.service.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "got: {errors:?}");
    }

    #[test]
    fn invalid_host_is_rejected() {
        let mut config = valid_config();
        config.gateway.host = "bad host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("gateway.host"))));
    }
}
