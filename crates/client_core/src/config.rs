use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::{DEFAULT_AGENT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};

pub const SETTINGS_FILE: &str = "duck.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub agent_endpoint: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent_endpoint: DEFAULT_AGENT_ENDPOINT.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("agent endpoint '{endpoint}' is not a valid URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("agent endpoint must use http or https, got '{scheme}'")]
    UnsupportedScheme { scheme: String },
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    agent_endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl Settings {
    /// Endpoint with surrounding whitespace and trailing slashes removed.
    pub fn validated_endpoint(&self) -> Result<String, ConfigError> {
        let raw = self.agent_endpoint.trim();
        let parsed = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
            other => Err(ConfigError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Duration::from_secs(self.request_timeout_secs))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment overrides.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.agent_endpoint {
                    settings.agent_endpoint = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = v;
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable settings file: {err}");
            }
        }
    }

    if let Some(v) = env("DUCK_AGENT_ENDPOINT") {
        settings.agent_endpoint = v;
    }
    if let Some(v) = env("APP__AGENT_ENDPOINT") {
        settings.agent_endpoint = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
