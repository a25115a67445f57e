use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::search::SearchConfig;
use crate::server::RequestLimits;

pub const CONFIG_ENV: &str = "TIMETABLE_CONFIG";
pub const BIND_ENV: &str = "TIMETABLE_BIND";

/// Wall-clock budget per search when the file does not set one.
pub const DEFAULT_TIME_LIMIT_MS: u64 = 30_000;

/// Service settings. Every field is optional in the file; the getters supply
/// the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
    pub max_variation: Option<u32>,
    pub max_options: Option<usize>,
    #[serde(default)]
    pub search: SearchConfig,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        self.bind_address
            .clone()
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Search settings the service runs with. A missing time limit gets
    /// [`DEFAULT_TIME_LIMIT_MS`].
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            time_limit_ms: self.search.time_limit_ms.or(Some(DEFAULT_TIME_LIMIT_MS)),
            ..self.search.clone()
        }
    }

    pub fn limits(&self) -> RequestLimits {
        let defaults = RequestLimits::default();
        RequestLimits {
            max_variation: self.max_variation.unwrap_or(defaults.max_variation),
            max_options: self.max_options.unwrap_or(defaults.max_options),
        }
    }

    /// Applies environment overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind) = env::var(BIND_ENV) {
            self.bind_address = Some(bind);
        }
        self
    }
}

pub fn read_config(path: &Path) -> Result<ServerConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config at {}", path.display()))
}

/// Reads the config named on the command line or in `TIMETABLE_CONFIG`, or
/// falls back to defaults when neither is set.
pub fn load_config(cli_path: Option<String>) -> Result<ServerConfig> {
    let config = match cli_path.or_else(|| env::var(CONFIG_ENV).ok()) {
        Some(path) => read_config(Path::new(&path))?,
        None => ServerConfig::default(),
    };
    Ok(config.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.search_config().time_limit_ms, Some(DEFAULT_TIME_LIMIT_MS));
        assert_eq!(config.limits(), RequestLimits::default());
    }

    #[test]
    fn test_file_limits_override_defaults() {
        let config: ServerConfig = serde_json::from_str(
            r#"{ "maxVariation": 2, "maxOptions": 4, "search": { "timeLimitMs": 250 } }"#,
        )
        .unwrap();
        assert_eq!(
            config.limits(),
            RequestLimits {
                max_variation: 2,
                max_options: 4
            }
        );
        assert_eq!(config.search_config().time_limit_ms, Some(250));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ServerConfig = serde_json::from_str(
            r#"{ "bindAddress": "0.0.0.0:9000", "search": { "baseAttempts": 20, "timeLimitMs": 500 } }"#,
        )
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.search.base_attempts, 20);
        assert_eq!(config.search.attempts_per_variation, 50);
        assert_eq!(config.search.time_limit_ms, Some(500));
        assert!(!config.search.enforce_faculty_caps);
    }

    #[test]
    fn test_read_config_from_file() {
        let path = env::temp_dir().join(format!("timetable-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "logLevel": "debug" }"#).unwrap();
        let config = read_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_config(Path::new("/nonexistent/timetable.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
