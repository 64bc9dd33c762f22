//! LLM label ingestion: prompt rendering, response parsing, flattening,
//! and the sequential classification driver.

pub mod flatten;
pub mod prompt;
pub mod response;
pub mod runner;

pub use flatten::{flatten_responses, rater_labels, FlatFeatureRow, LlmResponseRow};
pub use prompt::{render_prompt, render_prompt_for, PromptFields};
pub use response::{
    extract_json, normalize_feature, parse_labels, parse_value, strip_code_fence, FeatureEntry,
    LabelResponse, ParsedLabels, PresenceEntry, SupportMap, DEFAULT_SUPPORT,
};
pub use runner::{ClassificationRunner, RunnerOptions};
