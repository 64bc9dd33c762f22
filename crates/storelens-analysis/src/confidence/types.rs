//! Scoring policy and verdict types.

use serde::{Deserialize, Serialize};

use storelens_core::config::ScoringConfig;
use storelens_core::constants;

/// Rule-table thresholds. Defaults reproduce the published cut points
/// exactly; downstream consumers depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub multi_source_confidence: f64,
    pub corroborated_confidence: f64,
    pub single_source_confidence: f64,
    pub reviews_only_confidence: f64,
    pub min_sources_for_multi: u32,
    pub corroboration_review_hits: u32,
    pub reviews_only_review_hits: u32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            multi_source_confidence: constants::DEFAULT_MULTI_SOURCE_CONFIDENCE,
            corroborated_confidence: constants::DEFAULT_CORROBORATED_CONFIDENCE,
            single_source_confidence: constants::DEFAULT_SINGLE_SOURCE_CONFIDENCE,
            reviews_only_confidence: constants::DEFAULT_REVIEWS_ONLY_CONFIDENCE,
            min_sources_for_multi: constants::DEFAULT_MIN_SOURCES_FOR_MULTI,
            corroboration_review_hits: constants::DEFAULT_CORROBORATION_REVIEW_HITS,
            reviews_only_review_hits: constants::DEFAULT_REVIEWS_ONLY_REVIEW_HITS,
        }
    }
}

impl ScoringPolicy {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            multi_source_confidence: config.effective_multi_source_confidence(),
            corroborated_confidence: config.effective_corroborated_confidence(),
            single_source_confidence: config.effective_single_source_confidence(),
            reviews_only_confidence: config.effective_reviews_only_confidence(),
            min_sources_for_multi: config.effective_min_sources_for_multi(),
            corroboration_review_hits: config.effective_corroboration_review_hits(),
            reviews_only_review_hits: config.effective_reviews_only_review_hits(),
        }
    }
}

/// Which rule of the table fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceTier {
    /// Enough distinct non-review sources.
    MultiSource,
    /// One source, corroborated by review volume.
    Corroborated,
    /// One source alone.
    SingleSource,
    /// No source, but high review volume.
    ReviewsOnly,
    /// Not flagged.
    Insufficient,
}

impl EvidenceTier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MultiSource => "multi_source",
            Self::Corroborated => "corroborated",
            Self::SingleSource => "single_source",
            Self::ReviewsOnly => "reviews_only",
            Self::Insufficient => "insufficient",
        }
    }
}

/// Outcome of scoring one (app, feature).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verdict {
    pub flagged: bool,
    pub confidence: f64,
    pub tier: EvidenceTier,
}

impl Verdict {
    pub fn not_flagged() -> Self {
        Self {
            flagged: false,
            confidence: 0.0,
            tier: EvidenceTier::Insufficient,
        }
    }
}
