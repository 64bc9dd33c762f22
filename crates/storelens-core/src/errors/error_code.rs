//! StorelensErrorCode trait for CLI diagnostics.

/// Trait for mapping storelens errors to stable code strings.
/// Every error enum implements this so the CLI can print
/// `[ERROR_CODE] message` regardless of which stage failed.
pub trait StorelensErrorCode {
    /// Returns the stable error code string (e.g., "MISSING_INPUT").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted diagnostic: `[ERROR_CODE] message`.
    fn diagnostic(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PATTERN_ERROR: &str = "PATTERN_ERROR";
pub const MISSING_INPUT: &str = "MISSING_INPUT";
pub const MALFORMED_RECORD: &str = "MALFORMED_RECORD";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const LABEL_PARSE_ERROR: &str = "LABEL_PARSE_ERROR";
pub const EXTERNAL_CALL_FAILED: &str = "EXTERNAL_CALL_FAILED";
pub const UNKNOWN_FEATURE: &str = "UNKNOWN_FEATURE";
