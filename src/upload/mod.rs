//! Upload and conversion.
//!
//! Packages a candidate file as a multipart form, posts it to the
//! conversion endpoint and returns the artifact. Two response protocols
//! are supported:
//!
//! - **sync**: the POST response body is the artifact.
//! - **task**: the POST starts a background conversion which is polled
//!   through `/status/<task_id>` and fetched from its `download_url`.
//!
//! Any non-2xx status or transport error is a failure; there is no retry.

mod artifact;
mod client;
mod config;
mod task;

pub use artifact::Artifact;
pub use client::{Converter, HttpConverter, UploadError};
pub use config::{UploadConfig, UploadMode};
pub use task::{TaskStarted, TaskState, TaskStatus};
