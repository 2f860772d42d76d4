//! HTTP conversion client.

use super::task::{TaskStarted, TaskState, TaskStatus};
use super::{Artifact, UploadConfig, UploadMode};
use crate::media::CandidateFile;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("mobilsheets-client/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while converting a file remotely.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("conversion failed on server: {0}")]
    Conversion(String),
    #[error("unexpected response: {0}")]
    Protocol(String),
    #[error("conversion not finished after {0} status checks")]
    TimedOut(u32),
    #[error("invalid upload configuration: {0}")]
    Config(String),
}

/// Something that turns a candidate file into a conversion artifact.
///
/// Every call is an independent request; nothing is retried.
pub trait Converter {
    fn convert(
        &self,
        file: &CandidateFile,
    ) -> impl Future<Output = Result<Artifact, UploadError>> + Send;
}

/// Converter backed by the HTTP conversion service.
pub struct HttpConverter {
    http_client: reqwest::Client,
    endpoint: Url,
    config: UploadConfig,
}

impl HttpConverter {
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        config
            .validate()
            .map_err(|e| UploadError::Config(e.to_string()))?;
        let endpoint = config
            .endpoint_url()
            .map_err(|e| UploadError::Config(e.to_string()))?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            config,
        })
    }

    /// The endpoint files are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn form(&self, file: &CandidateFile) -> Result<Form, UploadError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.media_type().as_str())
            .map_err(|e| UploadError::Config(format!("media type {}: {}", file.media_type(), e)))?;
        Ok(Form::new().part(self.config.field_name.clone(), part))
    }

    async fn post_file(&self, file: &CandidateFile) -> Result<reqwest::Response, UploadError> {
        tracing::info!(
            endpoint = %self.endpoint,
            field = %self.config.field_name,
            file = %file.name(),
            bytes = file.len(),
            "Uploading file for conversion"
        );

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .multipart(self.form(file)?)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Conversion request rejected");
            return Err(UploadError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn convert_sync(&self, file: &CandidateFile) -> Result<Artifact, UploadError> {
        let response = self.post_file(file).await?;
        read_artifact(response).await
    }

    async fn convert_task(&self, file: &CandidateFile) -> Result<Artifact, UploadError> {
        let started: TaskStarted = self
            .post_file(file)
            .await?
            .json()
            .await
            .map_err(|e| UploadError::Protocol(e.to_string()))?;
        tracing::info!(task_id = %started.task_id, "Conversion task started");

        let status_url = self.status_url(&started.task_id)?;
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        for attempt in 1..=self.config.max_polls {
            let report = self.poll(&status_url).await?;
            match report.status {
                TaskState::Completed => {
                    let download = report.download_url.ok_or_else(|| {
                        UploadError::Protocol("completed task without download_url".into())
                    })?;
                    tracing::info!(task_id = %started.task_id, attempt, "Conversion task completed");
                    return self.download(&download).await;
                }
                TaskState::Error => {
                    return Err(UploadError::Conversion(
                        report.error.unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
                _ => {
                    tracing::debug!(
                        task_id = %started.task_id,
                        attempt,
                        message = report.message.as_deref().unwrap_or(""),
                        "Conversion still running"
                    );
                    if attempt < self.config.max_polls {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }

        Err(UploadError::TimedOut(self.config.max_polls))
    }

    async fn poll(&self, url: &Url) -> Result<TaskStatus, UploadError> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        // Failed tasks come back as HTTP 500 with a JSON report.
        match serde_json::from_str::<TaskStatus>(&body) {
            Ok(report) => Ok(report),
            Err(_) if !status.is_success() => Err(UploadError::Status(status.as_u16())),
            Err(e) => Err(UploadError::Protocol(e.to_string())),
        }
    }

    async fn download(&self, location: &str) -> Result<Artifact, UploadError> {
        let url = self.resolve(location)?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }
        read_artifact(response).await
    }

    /// Status URL for a task; the id is percent-encoded as one path segment.
    fn status_url(&self, task_id: &str) -> Result<Url, UploadError> {
        let mut url = self.resolve("/status")?;
        let base = url.to_string();
        url.path_segments_mut()
            .map_err(|_| UploadError::Protocol(format!("cannot build status URL from {base}")))?
            .push(task_id);
        Ok(url)
    }

    fn resolve(&self, location: &str) -> Result<Url, UploadError> {
        self.endpoint
            .join(location)
            .map_err(|e| UploadError::Protocol(format!("bad location {location}: {e}")))
    }
}

impl Converter for HttpConverter {
    fn convert(
        &self,
        file: &CandidateFile,
    ) -> impl Future<Output = Result<Artifact, UploadError>> + Send {
        async move {
            match self.config.mode {
                UploadMode::Sync => self.convert_sync(file).await,
                UploadMode::Task => self.convert_task(file).await,
            }
        }
    }
}

async fn read_artifact(response: reqwest::Response) -> Result<Artifact, UploadError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| UploadError::Network(e.to_string()))?;
    let artifact = Artifact::new(bytes.to_vec());

    if !artifact.looks_like_midi() {
        tracing::warn!(bytes = artifact.len(), "Artifact does not start with a MIDI header");
    }
    tracing::info!(
        bytes = artifact.len(),
        digest = %artifact.digest_hex(),
        "Conversion artifact received"
    );
    Ok(artifact)
}
