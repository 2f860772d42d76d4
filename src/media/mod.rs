//! Candidate files and their declared media types.
//!
//! Both acquisition paths end here: the picker path reads a file from
//! disk, the camera path wraps an encoded frame.

mod file;
mod types;

pub use file::{CandidateFile, MediaError};
pub use types::MediaType;
