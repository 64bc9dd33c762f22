//! storelens flat-file storage.
//!
//! Every persisted artifact is a CSV table with a stable column set.
//! Readers resolve each logical field from an ordered alias list once per
//! file; writers always emit the full header, so an empty result is a
//! header-only file rather than a missing one.

pub mod raw;
pub mod table;
pub mod tables;

pub use table::{require_input, Table, TableWriter};
