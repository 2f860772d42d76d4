//! Presenting conversion artifacts as downloads.

mod sink;

pub use sink::{DeliveryError, DirectorySink, DownloadSink, MemorySink};
