//! Confidence scorer: source signals + review hits -> (flagged, confidence).

pub mod scorer;
pub mod types;

pub use scorer::ConfidenceScorer;
pub use types::{EvidenceTier, ScoringPolicy, Verdict};
