//! Client configuration file.
//!
//! Every table is optional and falls back to its defaults:
//!
//! ```toml
//! [capture]
//! front_device = 0
//! back_device = 1
//! facing = "back"
//!
//! [upload]
//! endpoint = "http://localhost:5000/convert-sync"
//! field_name = "file"
//! mode = "sync"
//!
//! [validation]
//! allowed_types = ["image/jpeg", "image/png", "application/pdf"]
//!
//! [output]
//! dir = "."
//! download_name = "converted.mid"
//! overwrite = false
//! ```

use crate::capture::CaptureConfig;
use crate::media::MediaType;
use crate::upload::UploadConfig;
use crate::validation::AllowList;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),
    #[error("upload field name must not be empty")]
    EmptyFieldName,
    #[error("invalid download name `{0}`")]
    InvalidDownloadName(String),
    #[error("request timeout must be positive")]
    InvalidTimeout,
    #[error("task mode needs at least one status check")]
    InvalidPolling,
    #[error("allow-list must name at least one media type")]
    EmptyAllowList,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Allow-list configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Declared media types accepted for upload.
    pub allowed_types: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_types: AllowList::default()
                .types()
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        }
    }
}

impl ValidationConfig {
    /// Builds the allow-list from the configured types.
    pub fn allow_list(&self) -> AllowList {
        AllowList::new(
            self.allowed_types
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(MediaType::new),
        )
    }
}

/// Where downloads are saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Download directory.
    pub dir: PathBuf,
    /// File name the artifact is saved under.
    pub download_name: String,
    /// Replace an existing download instead of picking a new name.
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            download_name: "converted.mid".to_string(),
            overwrite: false,
        }
    }
}

impl OutputConfig {
    /// Validates the download name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.download_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ConfigError::InvalidDownloadName(self.download_name.clone()));
        }
        Ok(())
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: ClientConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.upload.validate()?;
        self.output.validate()?;
        if self.validation.allowed_types.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::EmptyAllowList);
        }
        Ok(())
    }
}
