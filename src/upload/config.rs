//! Upload endpoint configuration.
//!
//! Deployed backends differ in port, path and form field name, so none of
//! these are hard-coded.

use crate::config::ConfigError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the backend delivers the converted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// The POST response body is the artifact.
    #[default]
    Sync,
    /// The POST starts a task that is polled until it can be downloaded.
    Task,
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::Sync => write!(f, "sync"),
            UploadMode::Task => write!(f, "task"),
        }
    }
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(UploadMode::Sync),
            "task" | "async" => Ok(UploadMode::Task),
            other => Err(format!("unknown upload mode `{other}` (expected sync or task)")),
        }
    }
}

/// Configuration for the conversion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Endpoint the file is POSTed to.
    pub endpoint: String,
    /// Multipart field carrying the file.
    pub field_name: String,
    /// Response protocol.
    pub mode: UploadMode,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Delay between status checks in task mode.
    pub poll_interval_ms: u64,
    /// Status checks before giving up in task mode.
    pub max_polls: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/convert-sync".to_string(),
            field_name: "file".to_string(),
            mode: UploadMode::Sync,
            timeout_secs: 300, // backend conversion can take minutes
            poll_interval_ms: 1000,
            max_polls: 300,
        }
    }
}

impl UploadConfig {
    /// Creates a configuration targeting the given endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Parsed endpoint URL.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint(format!(
                "{}: scheme must be http or https",
                self.endpoint
            )));
        }
        Ok(url)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_url()?;
        if self.field_name.trim().is_empty() {
            return Err(ConfigError::EmptyFieldName);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.mode == UploadMode::Task && self.max_polls == 0 {
            return Err(ConfigError::InvalidPolling);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = UploadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.field_name, "file");
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = UploadConfig::with_endpoint("localhost:8000/convert");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("Task".parse::<UploadMode>().unwrap(), UploadMode::Task);
        assert_eq!("sync".parse::<UploadMode>().unwrap(), UploadMode::Sync);
        assert!("batch".parse::<UploadMode>().is_err());
    }
}
