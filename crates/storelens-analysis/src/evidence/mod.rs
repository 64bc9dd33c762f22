//! Evidence collector: which non-review text channels mention a feature.

pub mod collector;
pub mod types;

pub use collector::{collect, EvidenceText};
pub use types::{Source, SourceSet};
