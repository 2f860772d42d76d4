//! Camera capture configuration.

use super::FacingMode;
use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Largest accepted frame edge in pixels.
pub const MAX_DIMENSION: u32 = 8192;

/// Configuration for camera capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Device index used for the front-facing camera.
    pub front_device: u32,
    /// Device index used for the back-facing camera.
    pub back_device: u32,
    /// Requested frame width in pixels.
    pub width: u32,
    /// Requested frame height in pixels.
    pub height: u32,
    /// Target frames per second.
    pub fps: u32,
    /// Facing mode override. `None` picks by device type at startup.
    pub facing: Option<FacingMode>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            front_device: 0,
            back_device: 1,
            width: 1280,
            height: 720,
            fps: 30,
            facing: None,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Device index backing the given facing mode.
    pub fn device_for(&self, facing: FacingMode) -> u32 {
        match facing {
            FacingMode::Front => self.front_device,
            FacingMode::Back => self.back_device,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_oversized_dimensions_invalid() {
        let config = CaptureConfig::with_dimensions(40_000, 40_000);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
        assert!(CaptureConfig::with_dimensions(MAX_DIMENSION, MAX_DIMENSION)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_device_for_facing() {
        let config = CaptureConfig {
            front_device: 2,
            back_device: 5,
            ..Default::default()
        };
        assert_eq!(config.device_for(FacingMode::Front), 2);
        assert_eq!(config.device_for(FacingMode::Back), 5);
    }
}
