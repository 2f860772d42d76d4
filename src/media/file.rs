//! Candidate files awaiting validation and upload.

use super::MediaType;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a file from disk.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
}

/// An in-memory file payload with its declared type and display name.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateFile {
    name: String,
    media_type: MediaType,
    bytes: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes,
        }
    }

    /// Reads a file selected from disk.
    ///
    /// The declared type comes from the extension, the same way a file
    /// chooser reports it; the content is not sniffed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(MediaError::NotAFile(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| MediaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, MediaType::from_path(path), bytes))
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type.
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    /// File contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_path_declares_type_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not really a png")
            .unwrap();

        let file = CandidateFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "photo.png");
        assert_eq!(file.media_type(), &MediaType::PNG);
        assert_eq!(file.bytes(), b"not really a png");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CandidateFile::from_path(dir.path().join("absent.pdf"));
        assert!(matches!(result, Err(MediaError::Read { .. })));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CandidateFile::from_path(dir.path()),
            Err(MediaError::NotAFile(_))
        ));
    }
}
