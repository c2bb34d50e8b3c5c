//! Client configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured for local development;
//! it is skipped under `cfg(test)` so tests stay hermetic.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Backend origin, without trailing slash
    pub base_url: String,
    pub request_timeout: Duration,
    /// Where the access/refresh tokens are persisted
    pub token_path: PathBuf,
    /// `EnvFilter` directive for the tracing subscriber
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("MINDFUL_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "MINDFUL_API_BASE_URL".to_string(),
                format!("'{}' must start with http:// or https://", base_url),
            ));
        }

        let timeout_secs = match lookup("MINDFUL_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "MINDFUL_REQUEST_TIMEOUT_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    ))
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let token_path = match lookup("MINDFUL_TOKEN_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_token_path()
                .ok_or_else(|| ConfigError::MissingVar("MINDFUL_TOKEN_PATH".to_string()))?,
        };

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            token_path,
            log_filter,
        })
    }
}

/// `<config dir>/mindful-companion/tokens.json`, when the platform has a config dir
fn default_token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mindful-companion").join("tokens.json"))
}
