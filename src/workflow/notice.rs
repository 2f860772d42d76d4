//! User-visible notices.

use crate::validation::ValidationError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// Message shown for every network or server failure.
pub const CONVERSION_FAILED: &str = "Failed to convert file. Please try again.";

/// Something the user is told about.
#[derive(Debug, Clone)]
pub enum Notice {
    /// A file was picked or captured and is being submitted.
    Selected { name: String },
    /// The file type is not on the allow-list.
    Rejected(ValidationError),
    /// The picked file could not be read.
    Unreadable(String),
    /// Camera permission or device failure.
    CameraUnavailable(String),
    /// Network error or non-success response. The cause is only logged.
    ConversionFailed,
    /// The artifact was saved.
    Delivered(PathBuf),
}

impl Notice {
    /// Whether the notice reports a failure.
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Selected { .. } | Notice::Delivered(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Selected { name } => write!(f, "Selected file: {name}"),
            Notice::Rejected(e) => write!(f, "Invalid file type. {e}"),
            Notice::Unreadable(reason) => write!(f, "Could not read file: {reason}"),
            Notice::CameraUnavailable(reason) => write!(f, "Could not access the camera: {reason}"),
            Notice::ConversionFailed => f.write_str(CONVERSION_FAILED),
            Notice::Delivered(path) => write!(f, "Download saved to {}", path.display()),
        }
    }
}

/// Shows notices to the user.
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Prints notices to the terminal; failures go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_error() {
            eprintln!("{notice}");
        } else {
            println!("{notice}");
        }
    }
}

/// Keeps every notice for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice.clone());
        }
    }
}
