//! Flat-file storage errors.

use super::error_code::{self, StorelensErrorCode};

/// Errors that can occur while reading or writing tabular artifacts.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Required input not found: {path}")]
    MissingInput { path: String },

    #[error("{path} must include columns: {columns}")]
    MissingColumns { path: String, columns: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("CSV error in {path}: {message}")]
    Csv { path: String, message: String },

    #[error("Malformed record in {path} at line {line}: {message}")]
    MalformedRecord {
        path: String,
        line: u64,
        message: String,
    },
}

impl StorelensErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInput { .. } | Self::MissingColumns { .. } => error_code::MISSING_INPUT,
            Self::MalformedRecord { .. } => error_code::MALFORMED_RECORD,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
