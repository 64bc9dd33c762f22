//! Error handling for storelens.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod label_parse_error;
pub mod pattern_error;
pub mod pipeline_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::StorelensErrorCode;
pub use label_parse_error::LabelParseError;
pub use pattern_error::PatternError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use storage_error::StorageError;
