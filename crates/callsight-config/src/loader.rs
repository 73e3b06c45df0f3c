// SPDX-FileCopyrightText: 2026 Callsight Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./callsight.toml` > `~/.config/callsight/callsight.toml`
//! > `/etc/callsight/callsight.toml` with environment variable overrides via the
//! `CALLSIGHT_` prefix. The bare `GEMINI_API_KEY` and `DATABASE_URL` variables are
//! honored as fallbacks for the two required keys.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CallsightConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/callsight/callsight.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "callsight.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/callsight/callsight.toml` (system-wide)
/// 3. `~/.config/callsight/callsight.toml` (user XDG config)
/// 4. `./callsight.toml` (local directory)
/// 5. `GEMINI_API_KEY` / `DATABASE_URL`
/// 6. `CALLSIGHT_*` environment variables
pub fn load_config() -> Result<CallsightConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<CallsightConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CallsightConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CallsightConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CallsightConfig::default()))
        .merge(Toml::file(path))
        .merge(fallback_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CallsightConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(fallback_env_provider())
        .merge(env_provider())
}

/// Path of the per-user config file, if a config dir exists on this platform.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("callsight").join(LOCAL_CONFIG_FILE))
}

/// Map a lowercased, prefix-stripped env var name onto its dotted config path.
///
/// Uses explicit section prefixes rather than splitting on `_`, so that
/// `CALLSIGHT_GEMINI_API_KEY` maps to `gemini.api_key`, not `gemini.api.key`.
pub fn env_key_to_path(key: &str) -> String {
    for section in ["service", "gemini", "storage", "gateway"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("CALLSIGHT_")
        .map(|key| env_key_to_path(&key.as_str().to_ascii_lowercase()).into())
}

/// Bare variable names used by existing deployments.
fn fallback_env_provider() -> Env {
    Env::raw()
        .only(&["GEMINI_API_KEY", "DATABASE_URL"])
        .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
            "gemini_api_key" => "gemini.api_key".into(),
            "database_url" => "storage.database_url".into(),
            other => other.to_string().into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(env_key_to_path("gemini_api_key"), "gemini.api_key");
        assert_eq!(env_key_to_path("storage_database_url"), "storage.database_url");
        assert_eq!(env_key_to_path("storage_pool_size"), "storage.pool_size");
        assert_eq!(env_key_to_path("gateway_port"), "gateway.port");
        assert_eq!(env_key_to_path("service_log_level"), "service.log_level");
    }

    #[test]
    fn unknown_env_keys_pass_through() {
        assert_eq!(env_key_to_path("telemetry"), "telemetry");
        assert_eq!(env_key_to_path("geminix"), "geminix");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config: CallsightConfig = Figment::new()
            .merge(Serialized::defaults(CallsightConfig::default()))
            .merge(Toml::file("/nonexistent/path/callsight.toml"))
            .extract()
            .expect("missing file should be silently skipped");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
    }
}
