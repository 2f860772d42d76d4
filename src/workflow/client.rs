//! The upload/convert client.

use super::{Command, Notice, Notifier, Outcome, Status, StatusBoard};
use crate::capture::{CameraProvider, CaptureError, CaptureSessionManager};
use crate::config::ClientConfig;
use crate::delivery::DownloadSink;
use crate::media::CandidateFile;
use crate::metrics::{ClientMetrics, MetricsError};
use crate::upload::Converter;
use crate::validation::AllowList;
use std::path::Path;

/// Settings that do not belong to any collaborator.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Accepted declared media types.
    pub allow_list: AllowList,
    /// Name the artifact is saved under.
    pub download_name: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            allow_list: AllowList::default(),
            download_name: "converted.mid".to_string(),
        }
    }
}

impl From<&ClientConfig> for ClientOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            allow_list: config.validation.allow_list(),
            download_name: config.output.download_name.clone(),
        }
    }
}

/// Ties acquisition, validation, upload and delivery together.
///
/// Camera commands need `&mut self` because they change the single
/// capture session. Submissions only need `&self`, so several uploads
/// may be in flight; the newest one owns the visible status.
pub struct ConvertClient<P, C, S, N>
where
    P: CameraProvider,
{
    sessions: CaptureSessionManager<P>,
    converter: C,
    sink: S,
    notifier: N,
    options: ClientOptions,
    status: StatusBoard,
    metrics: ClientMetrics,
}

impl<P, C, S, N> ConvertClient<P, C, S, N>
where
    P: CameraProvider,
    C: Converter,
    S: DownloadSink,
    N: Notifier,
{
    pub fn new(
        sessions: CaptureSessionManager<P>,
        converter: C,
        sink: S,
        notifier: N,
        options: ClientOptions,
    ) -> Result<Self, MetricsError> {
        Ok(Self {
            sessions,
            converter,
            sink,
            notifier,
            options,
            status: StatusBoard::new(),
            metrics: ClientMetrics::new()?,
        })
    }

    /// Runs one UI action.
    pub async fn dispatch(&mut self, command: Command) -> Outcome {
        tracing::debug!(?command, "Dispatching command");
        match command {
            Command::SelectFile(path) => self.select_file(&path).await,
            Command::Submit(file) => self.submit(file).await,
            Command::OpenCamera => self.open_camera(),
            Command::SwitchCamera => self.switch_camera(),
            Command::CloseCamera => self.close_camera(),
            Command::Capture => self.capture().await,
        }
    }

    /// Picker path: reads `path` and submits it.
    pub async fn select_file(&self, path: &Path) -> Outcome {
        match CandidateFile::from_path(path) {
            Ok(file) => self.submit(file).await,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Selected file unreadable");
                self.notifier.notify(&Notice::Unreadable(e.to_string()));
                Outcome::Failed
            }
        }
    }

    /// Starts a capture session, replacing any active one.
    pub fn open_camera(&mut self) -> Outcome {
        match self.sessions.start() {
            Ok(facing) => {
                self.metrics.record_camera_session();
                Outcome::CameraStarted(facing)
            }
            Err(e) => self.camera_unavailable(e.to_string()),
        }
    }

    /// Flips the facing mode, restarting an active session.
    pub fn switch_camera(&mut self) -> Outcome {
        let was_active = self.sessions.is_active();
        match self.sessions.switch_facing() {
            Ok(facing) if was_active => {
                self.metrics.record_camera_session();
                Outcome::CameraStarted(facing)
            }
            Ok(facing) => Outcome::FacingChanged(facing),
            Err(e) => self.camera_unavailable(e.to_string()),
        }
    }

    /// Tears down the capture session.
    pub fn close_camera(&mut self) -> Outcome {
        self.sessions.stop();
        Outcome::CameraClosed
    }

    /// Camera path: freezes the current frame and submits it.
    pub async fn capture(&mut self) -> Outcome {
        match self.sessions.capture() {
            Ok(file) => self.submit(file).await,
            Err(CaptureError::Camera(e)) => self.camera_unavailable(e.to_string()),
            Err(CaptureError::Frame(e)) => {
                tracing::error!(error = %e, "Captured frame could not be encoded");
                self.metrics.record_camera_failure();
                self.notifier.notify(&Notice::CameraUnavailable(e.to_string()));
                Outcome::Failed
            }
        }
    }

    /// Validates, uploads and delivers one file.
    pub async fn submit(&self, file: CandidateFile) -> Outcome {
        if let Err(e) = self.options.allow_list.check(&file) {
            tracing::warn!(file = %file.name(), media_type = %file.media_type(), "File rejected");
            self.metrics.record_rejected();
            self.notifier.notify(&Notice::Rejected(e));
            return Outcome::Rejected;
        }

        self.notifier.notify(&Notice::Selected {
            name: file.name().to_string(),
        });
        let ticket = self.status.begin(file.name());
        self.metrics.record_upload_started();

        let result = self.converter.convert(&file).await;
        self.metrics.record_upload_settled();

        if !self.status.is_current(ticket) {
            return self.superseded(ticket, &file);
        }

        let artifact = match result {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!(generation = ticket.generation(), error = %e, "Conversion failed");
                return self.conversion_failed(ticket, &file);
            }
        };

        let delivered = self.status.deliver_with(ticket, || {
            self.sink.deliver(&self.options.download_name, &artifact)
        });
        match delivered {
            Some(Ok(path)) => {
                self.metrics.record_delivered(artifact.len());
                self.notifier.notify(&Notice::Delivered(path.clone()));
                Outcome::Delivered(path)
            }
            Some(Err(e)) => {
                tracing::error!(generation = ticket.generation(), error = %e, "Download failed");
                self.metrics.record_upload_failed();
                self.notifier.notify(&Notice::ConversionFailed);
                Outcome::Failed
            }
            None => self.superseded(ticket, &file),
        }
    }

    fn superseded(&self, ticket: super::Ticket, file: &CandidateFile) -> Outcome {
        tracing::info!(
            generation = ticket.generation(),
            file = %file.name(),
            "Discarding result of superseded upload"
        );
        self.metrics.record_superseded();
        Outcome::Superseded
    }

    fn conversion_failed(&self, ticket: super::Ticket, file: &CandidateFile) -> Outcome {
        if !self.status.fail(ticket) {
            return self.superseded(ticket, file);
        }
        self.metrics.record_upload_failed();
        self.notifier.notify(&Notice::ConversionFailed);
        Outcome::Failed
    }

    fn camera_unavailable(&self, reason: String) -> Outcome {
        tracing::warn!(%reason, "Camera unavailable");
        self.metrics.record_camera_failure();
        self.notifier.notify(&Notice::CameraUnavailable(reason));
        Outcome::CameraUnavailable
    }

    /// Current visible status.
    pub fn status(&self) -> Status {
        self.status.status()
    }

    /// Current status label text.
    pub fn label(&self) -> &'static str {
        self.status.label()
    }

    /// The capture session manager.
    pub fn sessions(&self) -> &CaptureSessionManager<P> {
        &self.sessions
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureConfig, FacingMode, MockCameraProvider};
    use crate::delivery::MemorySink;
    use crate::media::MediaType;
    use crate::upload::{Artifact, UploadError};
    use crate::workflow::RecordingNotifier;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const MIDI: &[u8] = &[0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06];

    /// Answers with a fixed result after a per-file delay.
    #[derive(Default)]
    struct ScriptedConverter {
        calls: AtomicUsize,
        fail: bool,
        slow_file: Option<String>,
    }

    impl Converter for ScriptedConverter {
        fn convert(
            &self,
            file: &CandidateFile,
        ) -> impl Future<Output = Result<Artifact, UploadError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = match &self.slow_file {
                Some(name) if name == file.name() => Duration::from_millis(80),
                _ => Duration::from_millis(5),
            };
            let fail = self.fail;
            let body = file.name().as_bytes().to_vec();
            async move {
                tokio::time::sleep(delay).await;
                if fail {
                    Err(UploadError::Status(500))
                } else {
                    Ok(Artifact::new([MIDI, body.as_slice()].concat()))
                }
            }
        }
    }

    type TestClient =
        ConvertClient<MockCameraProvider, ScriptedConverter, MemorySink, RecordingNotifier>;

    fn client(provider: MockCameraProvider, converter: ScriptedConverter) -> TestClient {
        let sessions = CaptureSessionManager::new(
            provider,
            CaptureConfig::with_dimensions(16, 12),
            FacingMode::Front,
        );
        ConvertClient::new(
            sessions,
            converter,
            MemorySink::new(),
            RecordingNotifier::new(),
            ClientOptions::default(),
        )
        .unwrap()
    }

    fn png(name: &str) -> CandidateFile {
        CandidateFile::new(name, MediaType::PNG, vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_rejected_file_never_reaches_converter() {
        let client = client(MockCameraProvider::new(), ScriptedConverter::default());
        let notes = CandidateFile::new("notes.txt", MediaType::PLAIN_TEXT, b"do re mi".to_vec());

        let outcome = client.submit(notes).await;

        assert_eq!(outcome, Outcome::Rejected);
        assert_eq!(client.converter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.status(), Status::Idle);
        let notices = client.notifier().notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].to_string().contains("JPEG image, PNG image or PDF document"));
    }

    #[tokio::test]
    async fn test_accepted_file_delivered_once() {
        let client = client(MockCameraProvider::new(), ScriptedConverter::default());

        let outcome = client.submit(png("photo.png")).await;

        assert!(matches!(outcome, Outcome::Delivered(_)));
        assert_eq!(client.converter.calls.load(Ordering::SeqCst), 1);
        let deliveries = client.sink().deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "converted.mid");
        assert!(deliveries[0].1.starts_with(MIDI));
        assert_eq!(client.label(), "Download ready");
    }

    #[tokio::test]
    async fn test_failure_is_generic_and_not_delivered() {
        let converter = ScriptedConverter {
            fail: true,
            ..Default::default()
        };
        let client = client(MockCameraProvider::new(), converter);

        let outcome = client.submit(png("photo.png")).await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(client.sink().deliveries().is_empty());
        assert!(matches!(client.status(), Status::Failed { .. }));
        assert!(client
            .notifier()
            .notices()
            .iter()
            .any(|n| matches!(n, Notice::ConversionFailed)));
    }

    #[tokio::test]
    async fn test_stale_failure_is_silent() {
        let converter = ScriptedConverter {
            fail: true,
            slow_file: Some("first.png".to_string()),
            ..Default::default()
        };
        let client = client(MockCameraProvider::new(), converter);

        let (first, second) =
            tokio::join!(client.submit(png("first.png")), client.submit(png("second.png")));

        assert_eq!(first, Outcome::Superseded);
        assert_eq!(second, Outcome::Failed);
        let failures = client
            .notifier()
            .notices()
            .iter()
            .filter(|n| matches!(n, Notice::ConversionFailed))
            .count();
        assert_eq!(failures, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_agree_with_status() {
        let client = Arc::new(client(MockCameraProvider::new(), ScriptedConverter::default()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.submit(png(&format!("page-{i}.png"))).await })
            })
            .collect();
        let mut delivered = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), Outcome::Delivered(_)) {
                delivered += 1;
            }
        }

        let announced = client
            .notifier()
            .notices()
            .iter()
            .filter(|n| matches!(n, Notice::Delivered(_)))
            .count();
        assert!(delivered >= 1);
        assert_eq!(client.sink().deliveries().len(), delivered);
        assert_eq!(announced, delivered);
        assert!(matches!(
            client.status(),
            Status::Delivered { ticket, .. } if ticket.generation() == 16
        ));
    }

    #[tokio::test]
    async fn test_latest_upload_wins() {
        let converter = ScriptedConverter {
            slow_file: Some("first.png".to_string()),
            ..Default::default()
        };
        let client = client(MockCameraProvider::new(), converter);

        let (first, second) =
            tokio::join!(client.submit(png("first.png")), client.submit(png("second.png")));

        assert_eq!(first, Outcome::Superseded);
        assert!(matches!(second, Outcome::Delivered(_)));

        let deliveries = client.sink().deliveries();
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].1.ends_with(b"second.png"));
        assert!(matches!(
            client.status(),
            Status::Delivered { ticket, .. } if ticket.generation() == 2
        ));
    }

    #[tokio::test]
    async fn test_capture_submits_png_and_releases_camera() {
        let provider = MockCameraProvider::new();
        let mut client = client(provider.clone(), ScriptedConverter::default());

        assert_eq!(
            client.dispatch(Command::OpenCamera).await,
            Outcome::CameraStarted(FacingMode::Front)
        );
        assert_eq!(provider.live_streams(), 1);

        let outcome = client.dispatch(Command::Capture).await;

        assert!(matches!(outcome, Outcome::Delivered(_)));
        assert_eq!(provider.live_streams(), 0);
        assert!(!client.sessions().is_active());
    }

    #[tokio::test]
    async fn test_reopen_and_switch_keep_one_stream() {
        let provider = MockCameraProvider::new();
        let mut client = client(provider.clone(), ScriptedConverter::default());

        client.dispatch(Command::OpenCamera).await;
        client.dispatch(Command::OpenCamera).await;
        assert_eq!(provider.live_streams(), 1);

        assert_eq!(
            client.dispatch(Command::SwitchCamera).await,
            Outcome::CameraStarted(FacingMode::Back)
        );
        assert_eq!(provider.live_streams(), 1);
        assert_eq!(provider.acquisitions(), 3);

        assert_eq!(client.dispatch(Command::CloseCamera).await, Outcome::CameraClosed);
        assert_eq!(provider.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_camera_denied_produces_no_file() {
        let mut client = client(
            MockCameraProvider::denying("permission dismissed"),
            ScriptedConverter::default(),
        );

        assert_eq!(
            client.dispatch(Command::OpenCamera).await,
            Outcome::CameraUnavailable
        );
        assert_eq!(
            client.dispatch(Command::Capture).await,
            Outcome::CameraUnavailable
        );
        assert_eq!(client.converter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_selection() {
        let client = client(MockCameraProvider::new(), ScriptedConverter::default());
        let outcome = client.select_file(Path::new("/definitely/not/here.png")).await;

        assert_eq!(outcome, Outcome::Failed);
        assert!(matches!(
            client.notifier().notices().as_slice(),
            [Notice::Unreadable(_)]
        ));
    }
}
