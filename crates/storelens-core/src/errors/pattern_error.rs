//! Pattern library errors.

use super::error_code::{self, StorelensErrorCode};

/// Errors that can occur while loading or compiling feature patterns.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid pattern file: {0}")]
    InvalidDefinition(String),

    #[error("Regex compilation failed for feature '{feature}': {message}")]
    CompilationFailed { feature: String, message: String },

    #[error("Unknown feature '{name}'. Valid: {valid}")]
    UnknownFeature { name: String, valid: String },
}

impl StorelensErrorCode for PatternError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownFeature { .. } => error_code::UNKNOWN_FEATURE,
            _ => error_code::PATTERN_ERROR,
        }
    }
}
