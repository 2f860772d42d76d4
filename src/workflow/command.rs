//! UI actions and their results.

use crate::capture::FacingMode;
use crate::media::CandidateFile;
use std::path::PathBuf;
use std::str::FromStr;

/// A user action, independent of any UI toolkit.
#[derive(Debug, Clone)]
pub enum Command {
    /// A file was picked from disk.
    SelectFile(PathBuf),
    /// An already loaded file is submitted.
    Submit(CandidateFile),
    /// Open the camera with the current facing mode.
    OpenCamera,
    /// Flip between front and back camera.
    SwitchCamera,
    /// Close the camera without capturing.
    CloseCamera,
    /// Freeze the current frame and submit it.
    Capture,
}

impl FromStr for Command {
    type Err = String;

    /// Parses the line syntax of the interactive session:
    /// `file <path>`, `open`, `switch`, `close`, `capture`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "file" | "upload" if !rest.is_empty() => Ok(Command::SelectFile(PathBuf::from(rest))),
            "file" | "upload" => Err("missing path after `file`".to_string()),
            "open" | "camera" => Ok(Command::OpenCamera),
            "switch" | "flip" => Ok(Command::SwitchCamera),
            "close" | "stop" => Ok(Command::CloseCamera),
            "capture" | "snap" => Ok(Command::Capture),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command `{other}`")),
        }
    }
}

/// What a command ended in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file type was refused; nothing was sent.
    Rejected,
    /// The artifact was saved at this path.
    Delivered(PathBuf),
    /// Reading, uploading, converting or saving failed.
    Failed,
    /// A newer upload started before this one finished; its result was dropped.
    Superseded,
    /// A capture session is active with this facing mode.
    CameraStarted(FacingMode),
    /// The facing mode was changed while no session was active.
    FacingChanged(FacingMode),
    /// The capture session was torn down.
    CameraClosed,
    /// The camera could not be used.
    CameraUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_with_spaces() {
        match "file  scans/page one.png".parse::<Command>().unwrap() {
            Command::SelectFile(path) => assert_eq!(path, PathBuf::from("scans/page one.png")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_camera_commands() {
        assert!(matches!("open".parse::<Command>(), Ok(Command::OpenCamera)));
        assert!(matches!("Switch".parse::<Command>(), Ok(Command::SwitchCamera)));
        assert!(matches!("capture".parse::<Command>(), Ok(Command::Capture)));
        assert!(matches!("close".parse::<Command>(), Ok(Command::CloseCamera)));
    }

    #[test]
    fn test_parse_errors() {
        assert!("file".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }
}
