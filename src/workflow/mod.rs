//! Command handling for the upload/convert client.
//!
//! UI actions arrive as [`Command`]s and are mapped onto the four
//! operations of the client: pick a file, run the camera, capture a
//! frame, and submit. Results come back as an [`Outcome`] plus the
//! [`Notice`]s shown to the user.
//!
//! ```text
//! SelectFile ─┐
//!             ├─► validate ─► upload ─► deliver
//! Capture ────┘       │          │         │
//!                  Rejected    Failed   Delivered / Superseded
//! ```

mod client;
mod command;
mod notice;
mod status;

pub use client::{ClientOptions, ConvertClient};
pub use command::{Command, Outcome};
pub use notice::{ConsoleNotifier, Notice, Notifier, RecordingNotifier, CONVERSION_FAILED};
pub use status::{Status, StatusBoard, Ticket};
