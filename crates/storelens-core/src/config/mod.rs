//! Configuration system for storelens.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod cleaning_config;
pub mod llm_config;
pub mod matrix_config;
pub mod review_config;
pub mod scoring_config;
pub mod sentiment_config;
pub mod storelens_config;

pub use cleaning_config::CleaningConfig;
pub use llm_config::{LlmConfig, PromptStyle};
pub use matrix_config::{MatrixConfig, SentimentWeighting};
pub use review_config::{DedupeScope, ReviewConfig};
pub use scoring_config::ScoringConfig;
pub use sentiment_config::SentimentConfig;
pub use storelens_config::{CliOverrides, StorelensConfig};
