//! Real camera devices through `nokhwa`.

use super::{Camera, CameraError, CameraProvider, CaptureConfig, FacingMode, Frame};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};

/// A camera device opened through the platform backend.
pub struct NokhwaCamera {
    index: u32,
    device: Option<nokhwa::Camera>,
    sequence: u64,
}

impl NokhwaCamera {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            device: None,
            sequence: 0,
        }
    }
}

impl Camera for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.close();

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(config.width, config.height),
                FrameFormat::MJPEG,
                config.fps,
            ),
        ));
        let mut device = nokhwa::Camera::new(CameraIndex::Index(self.index), requested)
            .map_err(|e| classify_open_error(self.index, e.to_string()))?;
        device
            .open_stream()
            .map_err(|e| classify_open_error(self.index, e.to_string()))?;

        tracing::info!(index = self.index, "Camera stream opened");
        self.device = Some(device);
        self.sequence = 0;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let device = self.device.as_mut().ok_or(CameraError::NotInitialized)?;
        let buffer = device
            .frame()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

        self.sequence += 1;
        let (width, height) = (decoded.width(), decoded.height());
        Ok(Frame::new(decoded.into_raw(), width, height, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.stop_stream() {
                tracing::warn!(index = self.index, "Failed to stop camera stream: {}", e);
            }
            tracing::info!(index = self.index, "Camera stream stopped");
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.close();
    }
}

/// Provides [`NokhwaCamera`]s mapped from facing mode to device index.
#[derive(Debug, Default)]
pub struct NokhwaCameraProvider;

impl CameraProvider for NokhwaCameraProvider {
    type Camera = NokhwaCamera;

    fn acquire(
        &mut self,
        facing: FacingMode,
        config: &CaptureConfig,
    ) -> Result<NokhwaCamera, CameraError> {
        let mut camera = NokhwaCamera::new(config.device_for(facing));
        camera.open(config)?;
        Ok(camera)
    }
}

fn classify_open_error(index: u32, message: String) -> CameraError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("permission") || lower.contains("denied") {
        CameraError::PermissionDenied(message)
    } else if lower.contains("not found") || lower.contains("no device") {
        CameraError::DeviceNotFound(format!("index {index}: {message}"))
    } else {
        CameraError::OpenFailed(message)
    }
}
