//! Camera input and frame handling.
//!
//! This module covers the camera path of file acquisition: choosing a
//! facing mode, holding a single capture session, and freezing a frame
//! into a PNG candidate file.

mod camera;
mod config;
mod facing;
mod frame;
#[cfg(feature = "camera")]
mod native;
mod session;

pub use camera::{Camera, CameraError, CameraProvider, MockCamera, MockCameraProvider};
pub use config::CaptureConfig;
pub use facing::{is_mobile_user_agent, FacingMode};
pub use frame::{Frame, FrameError};
#[cfg(feature = "camera")]
pub use native::{NokhwaCamera, NokhwaCameraProvider};
pub use session::{CaptureError, CaptureSessionManager};
