//! storelens analysis engine.
//!
//! Pure in-memory stages over canonical records: feature detection and
//! confidence scoring, matrix building, multi-rater agreement, sentiment,
//! LLM response parsing, and app normalization. File I/O lives in
//! `storelens-storage`; the only file this crate reads is an optional
//! pattern TOML.

pub mod agreement;
pub mod apps;
pub mod confidence;
pub mod evidence;
pub mod flags;
pub mod llm;
pub mod matrix;
pub mod patterns;
pub mod reviews;
pub mod sentiment;
