//! Core types, errors, config, tracing, and seam traits for storelens.
//!
//! Everything downstream (analysis, storage, cli) depends on this crate;
//! it depends on nothing internal.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;
