//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for the conversion client.
#[derive(Clone)]
pub struct ClientMetrics {
    registry: Registry,

    // Validation
    files_rejected: IntCounter,

    // Uploads
    uploads_started: IntCounter,
    uploads_failed: IntCounter,
    uploads_superseded: IntCounter,
    uploads_in_flight: IntGauge,

    // Delivery
    downloads_delivered: IntCounter,
    artifact_bytes: IntCounter,

    // Camera
    camera_sessions: IntCounter,
    camera_failures: IntCounter,
}

impl ClientMetrics {
    /// Creates a new registry with all client metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let files_rejected = IntCounter::new(
            "mobilsheets_files_rejected_total",
            "Files refused by the media type allow-list",
        )?;
        let uploads_started = IntCounter::new(
            "mobilsheets_uploads_started_total",
            "Conversion requests issued",
        )?;
        let uploads_failed = IntCounter::new(
            "mobilsheets_uploads_failed_total",
            "Conversion requests that failed (network, status or delivery)",
        )?;
        let uploads_superseded = IntCounter::new(
            "mobilsheets_uploads_superseded_total",
            "Conversion results discarded because a newer upload was started",
        )?;
        let uploads_in_flight = IntGauge::new(
            "mobilsheets_uploads_in_flight",
            "Conversion requests awaiting a response",
        )?;
        let downloads_delivered = IntCounter::new(
            "mobilsheets_downloads_delivered_total",
            "Artifacts saved as downloads",
        )?;
        let artifact_bytes = IntCounter::new(
            "mobilsheets_artifact_bytes_total",
            "Total bytes of delivered artifacts",
        )?;
        let camera_sessions = IntCounter::new(
            "mobilsheets_camera_sessions_total",
            "Capture sessions started",
        )?;
        let camera_failures = IntCounter::new(
            "mobilsheets_camera_failures_total",
            "Camera acquisitions or captures that failed",
        )?;

        registry.register(Box::new(files_rejected.clone()))?;
        registry.register(Box::new(uploads_started.clone()))?;
        registry.register(Box::new(uploads_failed.clone()))?;
        registry.register(Box::new(uploads_superseded.clone()))?;
        registry.register(Box::new(uploads_in_flight.clone()))?;
        registry.register(Box::new(downloads_delivered.clone()))?;
        registry.register(Box::new(artifact_bytes.clone()))?;
        registry.register(Box::new(camera_sessions.clone()))?;
        registry.register(Box::new(camera_failures.clone()))?;

        Ok(Self {
            registry,
            files_rejected,
            uploads_started,
            uploads_failed,
            uploads_superseded,
            uploads_in_flight,
            downloads_delivered,
            artifact_bytes,
            camera_sessions,
            camera_failures,
        })
    }

    pub fn record_rejected(&self) {
        self.files_rejected.inc();
    }

    pub fn record_upload_started(&self) {
        self.uploads_started.inc();
        self.uploads_in_flight.inc();
    }

    /// Marks an in-flight upload as settled.
    pub fn record_upload_settled(&self) {
        self.uploads_in_flight.dec();
    }

    pub fn record_upload_failed(&self) {
        self.uploads_failed.inc();
    }

    pub fn record_superseded(&self) {
        self.uploads_superseded.inc();
    }

    pub fn record_delivered(&self, bytes: usize) {
        self.downloads_delivered.inc();
        self.artifact_bytes.inc_by(bytes as u64);
    }

    pub fn record_camera_session(&self) {
        self.camera_sessions.inc();
    }

    pub fn record_camera_failure(&self) {
        self.camera_failures.inc();
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        assert!(ClientMetrics::new().is_ok());
    }

    #[test]
    fn test_upload_lifecycle_counters() {
        let metrics = ClientMetrics::new().unwrap();

        metrics.record_upload_started();
        metrics.record_upload_started();
        metrics.record_upload_settled();
        metrics.record_delivered(42);
        metrics.record_rejected();

        let output = metrics.encode().unwrap();
        assert!(output.contains("mobilsheets_uploads_started_total 2"));
        assert!(output.contains("mobilsheets_uploads_in_flight 1"));
        assert!(output.contains("mobilsheets_artifact_bytes_total 42"));
        assert!(output.contains("mobilsheets_files_rejected_total 1"));
    }

    #[test]
    fn test_metrics_encode() {
        let metrics = ClientMetrics::new().unwrap();
        let output = metrics.encode().unwrap();

        assert!(output.contains("mobilsheets_camera_sessions_total"));
        assert!(output.contains("mobilsheets_uploads_superseded_total"));
    }
}
