//! Pipeline errors and non-fatal error collection.

use super::error_code::{self, StorelensErrorCode};
use super::{ConfigError, LabelParseError, PatternError, StorageError};

/// Errors that can occur during a stage run.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Label parse error for {app_key}: {source}")]
    LabelParse {
        app_key: String,
        #[source]
        source: LabelParseError,
    },

    #[error("External call failed for {item} after {attempts} attempt(s): {message}")]
    ExternalCall {
        item: String,
        attempts: u32,
        message: String,
    },

    #[error("Malformed record {item}: {message}")]
    MalformedRecord { item: String, message: String },
}

impl StorelensErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Pattern(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::LabelParse { source, .. } => source.error_code(),
            Self::ExternalCall { .. } => error_code::EXTERNAL_CALL_FAILED,
            Self::MalformedRecord { .. } => error_code::MALFORMED_RECORD,
        }
    }
}

/// Result of a stage run that accumulates non-fatal errors.
/// Allows partial results to be returned even when some records fail.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal errors collected during the run.
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    /// Create a new result with no errors.
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Add a non-fatal error to the result.
    pub fn add_error(&mut self, error: PipelineError) {
        self.errors.push(error);
    }

    /// Returns true if there are no non-fatal errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of non-fatal errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
