//! One module per persisted artifact.

pub mod apps;
pub mod features;
pub mod labels;
pub mod llm;
pub mod reviews;
pub mod sentiment;
pub mod websites;
