//! Download sinks.

use crate::upload::Artifact;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while handing an artifact to the user.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid download name `{0}`")]
    InvalidName(String),
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to stage download: {0}")]
    Stage(#[from] std::io::Error),
    #[error("failed to save {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Presents a conversion artifact to the user as a named download.
pub trait DownloadSink {
    /// Delivers the artifact under `name`, returning where it ended up.
    fn deliver(&self, name: &str, artifact: &Artifact) -> Result<PathBuf, DeliveryError>;
}

/// Saves downloads into a directory.
///
/// Bytes are staged in a temporary file next to the target and renamed
/// into place, so a failed delivery leaves nothing behind.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            dir: dir.into(),
            overwrite,
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn target_for(&self, name: &str) -> PathBuf {
        let target = self.dir.join(name);
        if self.overwrite || !target.exists() {
            return target;
        }

        let as_path = Path::new(name);
        let stem = as_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let ext = as_path.extension().map(|e| e.to_string_lossy().into_owned());

        (1u32..)
            .map(|n| match &ext {
                Some(ext) => self.dir.join(format!("{stem} ({n}).{ext}")),
                None => self.dir.join(format!("{stem} ({n})")),
            })
            .find(|candidate| !candidate.exists())
            .unwrap_or(target)
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, name: &str, artifact: &Artifact) -> Result<PathBuf, DeliveryError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(DeliveryError::InvalidName(name.to_string()));
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| DeliveryError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(artifact.bytes())?;
        staged.flush()?;

        let target = self.target_for(name);
        let persisted = if self.overwrite {
            staged.persist(&target)
        } else {
            staged.persist_noclobber(&target)
        };
        persisted.map_err(|e| DeliveryError::Persist {
            path: target.clone(),
            source: e.error,
        })?;

        tracing::info!(
            path = %target.display(),
            bytes = artifact.len(),
            "Download saved"
        );
        Ok(target)
    }
}

/// Keeps downloads in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery so far, as (name, bytes).
    pub fn deliveries(&self) -> Vec<(String, Vec<u8>)> {
        self.deliveries
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, name: &str, artifact: &Artifact) -> Result<PathBuf, DeliveryError> {
        if let Ok(mut deliveries) = self.deliveries.lock() {
            deliveries.push((name.to_string(), artifact.bytes().to_vec()));
        }
        Ok(PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_deliver_leaves_only_target() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"), true);
        let artifact = Artifact::new(b"MThd\x00\x00\x00\x06".to_vec());

        let path = sink.deliver("converted.mid", &artifact).unwrap();

        assert_eq!(path, dir.path().join("out").join("converted.mid"));
        assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes());
        assert_eq!(entries(&dir.path().join("out")), vec!["converted.mid"]);
    }

    #[test]
    fn test_no_clobber_picks_suffixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path(), false);
        let artifact = Artifact::new(b"MThd".to_vec());

        sink.deliver("converted.mid", &artifact).unwrap();
        let second = sink.deliver("converted.mid", &artifact).unwrap();

        assert_eq!(second, dir.path().join("converted (1).mid"));
        assert_eq!(
            entries(dir.path()),
            vec!["converted (1).mid", "converted.mid"]
        );
    }

    #[test]
    fn test_overwrite_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path(), true);

        sink.deliver("output.mid", &Artifact::new(b"old".to_vec())).unwrap();
        let path = sink.deliver("output.mid", &Artifact::new(b"new".to_vec())).unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"new");
        assert_eq!(entries(dir.path()), vec!["output.mid"]);
    }

    #[test]
    fn test_rejects_path_names() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path(), true);
        assert!(matches!(
            sink.deliver("../escape.mid", &Artifact::new(vec![])),
            Err(DeliveryError::InvalidName(_))
        ));
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_persist_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("converted.mid");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), b"x").unwrap();
        let sink = DirectorySink::new(dir.path(), true);

        let result = sink.deliver("converted.mid", &Artifact::new(b"MThd".to_vec()));

        assert!(matches!(result, Err(DeliveryError::Persist { .. })));
        assert_eq!(entries(dir.path()), vec!["converted.mid"]);
        assert!(blocker.is_dir());
    }
}
