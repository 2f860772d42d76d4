//! Prometheus metrics for the conversion client.
//!
//! # Metrics Exposed
//!
//! - `mobilsheets_files_rejected_total` - Files refused by the allow-list
//! - `mobilsheets_uploads_started_total` - Conversion requests issued
//! - `mobilsheets_uploads_failed_total` - Failed conversions
//! - `mobilsheets_uploads_superseded_total` - Results dropped for a newer upload
//! - `mobilsheets_uploads_in_flight` - Requests awaiting a response
//! - `mobilsheets_downloads_delivered_total` - Artifacts saved
//! - `mobilsheets_artifact_bytes_total` - Bytes of saved artifacts
//! - `mobilsheets_camera_sessions_total` - Capture sessions started
//! - `mobilsheets_camera_failures_total` - Camera failures
//!
//! # Example
//!
//! ```no_run
//! use mobilsheets_client::metrics::ClientMetrics;
//!
//! let metrics = ClientMetrics::new().expect("Failed to create registry");
//! metrics.record_upload_started();
//! println!("{}", metrics.encode().unwrap());
//! ```

mod collector;

pub use collector::{ClientMetrics, MetricsError};
