//! MobilSheets Conversion Client Library
//!
//! Sends sheet-music images and PDFs to a conversion service and saves the
//! MIDI file it returns. Files come either from disk or from a camera frame
//! frozen into a PNG.
//!
//! # Architecture
//!
//! The client composes linearly:
//!
//! ```text
//! media / capture → validation → upload → delivery
//!          ↓             ↓          ↓         ↓
//!                workflow (commands, status, notices)
//! ```
//!
//! # Design Principles
//!
//! - **Validate before network**: nothing leaves the machine unless its
//!   declared media type is on the allow-list
//! - **One camera session**: a new session always releases the previous one,
//!   and capturing a frame ends the session
//! - **Latest upload wins**: results of superseded uploads never reach the user
//! - **No retries**: every failure is reported once and left to the user
//!
//! # Example
//!
//! ```no_run
//! use mobilsheets_client::{
//!     capture::{CaptureConfig, CaptureSessionManager, FacingMode, MockCameraProvider},
//!     delivery::DirectorySink,
//!     upload::{HttpConverter, UploadConfig},
//!     workflow::{ClientOptions, Command, ConsoleNotifier, ConvertClient},
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let sessions = CaptureSessionManager::new(
//!     MockCameraProvider::new(),
//!     CaptureConfig::default(),
//!     FacingMode::for_host(),
//! );
//! let converter = HttpConverter::new(UploadConfig::default())?;
//! let mut client = ConvertClient::new(
//!     sessions,
//!     converter,
//!     DirectorySink::new(".", false),
//!     ConsoleNotifier,
//!     ClientOptions::default(),
//! )?;
//!
//! client.dispatch(Command::SelectFile("photo.png".into())).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod delivery;
pub mod media;
pub mod metrics;
pub mod upload;
pub mod validation;
pub mod workflow;

// Re-export commonly used types at crate root
pub use capture::{Camera, CameraProvider, CaptureConfig, CaptureSessionManager, FacingMode, Frame};
pub use config::{ClientConfig, ConfigError};
pub use delivery::{DirectorySink, DownloadSink};
pub use media::{CandidateFile, MediaType};
pub use upload::{Artifact, Converter, HttpConverter, UploadConfig, UploadError};
pub use validation::{AllowList, ValidationError};
pub use workflow::{Command, ConvertClient, Outcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
