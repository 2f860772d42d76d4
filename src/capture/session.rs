//! Capture session lifecycle.
//!
//! A session is created on request, stays active until a frame is captured
//! or it is stopped, and is torn down before any replacement is acquired.
//! At most one session is active per manager.

use super::{Camera, CameraError, CameraProvider, CaptureConfig, FacingMode, FrameError};
use crate::media::{CandidateFile, MediaType};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced when turning a live session into a candidate file.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

struct ActiveSession<C> {
    camera: C,
    facing: FacingMode,
    started_at: DateTime<Utc>,
}

/// Owns the single camera session of a client.
pub struct CaptureSessionManager<P: CameraProvider> {
    provider: P,
    config: CaptureConfig,
    facing: FacingMode,
    active: Option<ActiveSession<P::Camera>>,
}

impl<P: CameraProvider> CaptureSessionManager<P> {
    /// Creates a manager with no active session.
    pub fn new(provider: P, config: CaptureConfig, facing: FacingMode) -> Self {
        Self {
            provider,
            config,
            facing,
            active: None,
        }
    }

    /// Facing mode the next session will use.
    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    /// Whether a session is currently active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Access to the camera provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Starts a session with the current facing mode.
    ///
    /// Any active session is torn down before the new camera is acquired.
    pub fn start(&mut self) -> Result<FacingMode, CameraError> {
        self.stop();

        let camera = self.provider.acquire(self.facing, &self.config)?;
        self.active = Some(ActiveSession {
            camera,
            facing: self.facing,
            started_at: Utc::now(),
        });
        tracing::info!(facing = %self.facing, "Capture session started");
        Ok(self.facing)
    }

    /// Flips the facing mode, restarting the session if one is active.
    pub fn switch_facing(&mut self) -> Result<FacingMode, CameraError> {
        self.facing = self.facing.toggled();
        if self.is_active() {
            self.start()?;
        }
        Ok(self.facing)
    }

    /// Tears down the active session, if any.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.camera.close();
            let held = Utc::now() - session.started_at;
            tracing::info!(
                facing = %session.facing,
                held_ms = held.num_milliseconds(),
                "Capture session torn down"
            );
        }
    }

    /// Captures the current frame as a PNG candidate file.
    ///
    /// The session is always torn down, whether or not the capture worked.
    pub fn capture(&mut self) -> Result<CandidateFile, CaptureError> {
        let mut session = self.active.take().ok_or(CameraError::NotInitialized)?;
        let grabbed = session.camera.capture();
        self.active = Some(session);
        self.stop();

        let frame = grabbed?;
        let png = frame.encode_png()?;
        let name = format!("capture-{}.png", Utc::now().format("%Y%m%dT%H%M%SZ"));
        tracing::info!(
            width = frame.width(),
            height = frame.height(),
            bytes = png.len(),
            "Frame captured"
        );
        Ok(CandidateFile::new(name, MediaType::PNG, png))
    }
}

impl<P: CameraProvider> Drop for CaptureSessionManager<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
