//! Runtime configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tally_plugin::{Isolation, DEFAULT_TIMEOUT};
use thiserror::Error;

pub const PLUGIN_DIR_VAR: &str = "TALLY_PLUGIN_DIR";
pub const HISTORY_PATH_VAR: &str = "TALLY_HISTORY_PATH";
pub const TIMEOUT_VAR: &str = "TALLY_TIMEOUT_MS";
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const LOG_FILE_VAR: &str = "LOG_FILE_PATH";

pub const DEFAULT_HISTORY_PATH: &str = "data/calculations.csv";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Descriptor directory; `None` uses the built-in command list
    pub plugin_dir: Option<PathBuf>,
    pub history_path: PathBuf,
    /// Zero disables the time box
    pub timeout: Duration,
    pub environment: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_dir: None,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            timeout: DEFAULT_TIMEOUT,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout = match get(TIMEOUT_VAR) {
            Some(value) => parse_timeout(&value)?,
            None => defaults.timeout,
        };

        Ok(Self {
            plugin_dir: get(PLUGIN_DIR_VAR).map(PathBuf::from),
            history_path: get(HISTORY_PATH_VAR).map(PathBuf::from).unwrap_or(defaults.history_path),
            timeout,
            environment: get(ENVIRONMENT_VAR).unwrap_or(defaults.environment),
            log_level: get(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_file: get(LOG_FILE_VAR).map(PathBuf::from),
        })
    }

    pub fn isolation(&self) -> Isolation {
        Isolation::with_timeout(self.timeout)
    }
}

/// Parse a millisecond count
pub fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidTimeout {
            var: TIMEOUT_VAR,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history_path, PathBuf::from("data/calculations.csv"));
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert!(config.plugin_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TALLY_PLUGIN_DIR", "plugins"),
            ("TALLY_HISTORY_PATH", "/tmp/h.csv"),
            ("TALLY_TIMEOUT_MS", "250"),
            ("ENVIRONMENT", "production"),
            ("LOG_LEVEL", "debug"),
            ("LOG_FILE_PATH", "logs/application.log"),
        ])
        .unwrap();

        assert_eq!(config.plugin_dir, Some(PathBuf::from("plugins")));
        assert_eq!(config.history_path, PathBuf::from("/tmp/h.csv"));
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.environment, "production");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("logs/application.log")));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = load(&[("TALLY_PLUGIN_DIR", "  "), ("LOG_LEVEL", "")]).unwrap();
        assert!(config.plugin_dir.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_zero_timeout_disables_time_box() {
        let config = load(&[("TALLY_TIMEOUT_MS", "0")]).unwrap();
        assert_eq!(config.isolation().timeout(), None);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = load(&[("TALLY_TIMEOUT_MS", "soon")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidTimeout {
                var: "TALLY_TIMEOUT_MS",
                value: "soon".to_string()
            }
        );
        assert!(err.to_string().contains("soon"));
    }
}
