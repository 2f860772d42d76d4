//! File-type validation.
//!
//! A pure predicate over the declared media type: nothing is uploaded
//! unless the type is on the allow-list.

mod allow_list;

pub use allow_list::{AllowList, ValidationError};
