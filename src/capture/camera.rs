//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.

use super::frame::RGB_CHANNELS;
use super::{CaptureConfig, FacingMode, Frame};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
///
/// This abstraction allows swapping between real camera hardware
/// and mock implementations for testing.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases the underlying stream.
    fn close(&mut self);
}

/// Hands out opened cameras for a requested facing mode.
pub trait CameraProvider {
    /// Camera type produced by this provider.
    type Camera: Camera;

    /// Acquires and opens the camera backing `facing`.
    fn acquire(
        &mut self,
        facing: FacingMode,
        config: &CaptureConfig,
    ) -> Result<Self::Camera, CameraError>;
}

/// Mock camera for testing that generates synthetic frames.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
    live: Arc<AtomicUsize>,
    fail_capture: bool,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_counter(live: Arc<AtomicUsize>, fail_capture: bool) -> Self {
        Self {
            live,
            fail_capture,
            ..Self::default()
        }
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        if self.config.is_none() {
            self.live.fetch_add(1, Ordering::SeqCst);
        }
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::debug!(width = config.width, height = config.height, "MockCamera opened");
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;
        if self.fail_capture {
            return Err(CameraError::CaptureFailed("synthetic capture failure".into()));
        }

        // Diagonal gradient shifted by sequence so consecutive frames differ.
        let (width, height) = (config.width, config.height);
        let mut pixels = Vec::with_capacity(width as usize * height as usize * RGB_CHANNELS);
        for y in 0..height {
            for x in 0..width {
                let shade = (u64::from(x) + u64::from(y) + self.sequence) % 256;
                pixels.extend_from_slice(&[shade as u8, (x % 256) as u8, (y % 256) as u8]);
            }
        }

        self.sequence += 1;
        Ok(Frame::new(pixels, width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        if self.config.take().is_some() {
            self.live.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!("MockCamera closed");
        }
    }
}

/// Provider of [`MockCamera`]s.
///
/// All cameras it hands out share a counter of open streams, so tests can
/// observe whether a session was released.
#[derive(Debug, Clone, Default)]
pub struct MockCameraProvider {
    live: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
    deny: Option<String>,
    fail_capture: bool,
}

impl MockCameraProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every acquisition fails as if permission was refused.
    pub fn denying(reason: impl Into<String>) -> Self {
        Self {
            deny: Some(reason.into()),
            ..Self::default()
        }
    }

    /// A provider whose cameras open but fail to deliver frames.
    pub fn failing_capture() -> Self {
        Self {
            fail_capture: true,
            ..Self::default()
        }
    }

    /// Number of camera streams currently open.
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of successful acquisitions so far.
    pub fn acquisitions(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl CameraProvider for MockCameraProvider {
    type Camera = MockCamera;

    fn acquire(
        &mut self,
        facing: FacingMode,
        config: &CaptureConfig,
    ) -> Result<MockCamera, CameraError> {
        if let Some(reason) = &self.deny {
            return Err(CameraError::PermissionDenied(reason.clone()));
        }

        let mut camera = MockCamera::with_counter(Arc::clone(&self.live), self.fail_capture);
        camera.open(config)?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        tracing::info!(%facing, device = config.device_for(facing), "Mock camera acquired");
        Ok(camera)
    }
}
