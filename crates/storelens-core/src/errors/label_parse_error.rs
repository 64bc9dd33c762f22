//! LLM label parsing errors.

use super::error_code::{self, StorelensErrorCode};

/// Errors raised while interpreting a labeler's response payload.
/// These never abort a batch; the parser turns them into an empty result.
#[derive(Debug, thiserror::Error)]
pub enum LabelParseError {
    #[error("No JSON payload found in response")]
    NoPayload,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Unrecognized response shape")]
    UnrecognizedShape,
}

impl StorelensErrorCode for LabelParseError {
    fn error_code(&self) -> &'static str {
        error_code::LABEL_PARSE_ERROR
    }
}
