//! Declared media types.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// A declared MIME type, compared by exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaType(Cow<'static, str>);

impl MediaType {
    pub const JPEG: MediaType = MediaType(Cow::Borrowed("image/jpeg"));
    pub const PNG: MediaType = MediaType(Cow::Borrowed("image/png"));
    pub const PDF: MediaType = MediaType(Cow::Borrowed("application/pdf"));
    pub const PLAIN_TEXT: MediaType = MediaType(Cow::Borrowed("text/plain"));
    pub const OCTET_STREAM: MediaType = MediaType(Cow::Borrowed("application/octet-stream"));

    /// Wraps an arbitrary declared type.
    pub fn new(mime: impl Into<String>) -> Self {
        MediaType(Cow::Owned(mime.into()))
    }

    /// The MIME string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Declared type for a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Self {
        let mime = match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => return Self::JPEG,
            "png" => return Self::PNG,
            "pdf" => return Self::PDF,
            "txt" | "text" => return Self::PLAIN_TEXT,
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            "svg" => "image/svg+xml",
            "xml" | "musicxml" => "application/vnd.recordare.musicxml+xml",
            "mxl" => "application/vnd.recordare.musicxml",
            "mid" | "midi" => "audio/midi",
            _ => return Self::OCTET_STREAM,
        };
        MediaType(Cow::Borrowed(mime))
    }

    /// Declared type for a path, by its extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::OCTET_STREAM)
    }

    /// Human-readable name, used in user-facing messages.
    pub fn describe(&self) -> Cow<'_, str> {
        match self.as_str() {
            "image/jpeg" => "JPEG image".into(),
            "image/png" => "PNG image".into(),
            "application/pdf" => "PDF document".into(),
            other => other.into(),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MediaType {
    fn from(mime: &str) -> Self {
        MediaType::new(mime)
    }
}
