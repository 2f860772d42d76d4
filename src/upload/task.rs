//! Wire types of the task-based conversion protocol.
//!
//! `POST <endpoint>` answers `{"task_id", "status"}`, then
//! `GET /status/<task_id>` reports progress until it carries a
//! `download_url` or an `error`.

use serde::Deserialize;

/// Response to the initial upload.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStarted {
    pub task_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Task progress as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Started,
    Processing,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// Body of a status check.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    pub status: TaskState,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_reports() {
        let processing: TaskStatus = serde_json::from_str(
            r#"{"status": "processing", "message": "Converting image to MIDI..."}"#,
        )
        .unwrap();
        assert_eq!(processing.status, TaskState::Processing);

        let done: TaskStatus =
            serde_json::from_str(r#"{"status": "completed", "download_url": "/download/42"}"#)
                .unwrap();
        assert_eq!(done.download_url.as_deref(), Some("/download/42"));

        let odd: TaskStatus = serde_json::from_str(r#"{"status": "queued"}"#).unwrap();
        assert_eq!(odd.status, TaskState::Unknown);
    }

    #[test]
    fn test_missing_status_is_an_error() {
        assert!(serde_json::from_str::<TaskStatus>(r#"{"error": "Task not found"}"#).is_err());
    }
}
