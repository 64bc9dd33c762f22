//! Confidence scoring configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Thresholds of the confidence rule table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    /// Confidence for two or more matched sources. Default: 0.80.
    pub multi_source_confidence: Option<f64>,
    /// Confidence for one source with review corroboration. Default: 0.70.
    pub corroborated_confidence: Option<f64>,
    /// Confidence for one source alone. Default: 0.60.
    pub single_source_confidence: Option<f64>,
    /// Confidence for a reviews-only signal. Default: 0.55.
    pub reviews_only_confidence: Option<f64>,
    /// Distinct sources for the multi-source tier. Default: 2.
    pub min_sources_for_multi: Option<u32>,
    /// Review hits that corroborate a single source. Default: 10.
    pub corroboration_review_hits: Option<u32>,
    /// Review hits needed without any source match. Default: 25.
    pub reviews_only_review_hits: Option<u32>,
    /// Pattern TOML replacing the built-in feature library.
    pub patterns_path: Option<String>,
}

impl ScoringConfig {
    pub fn effective_multi_source_confidence(&self) -> f64 {
        self.multi_source_confidence
            .unwrap_or(constants::DEFAULT_MULTI_SOURCE_CONFIDENCE)
    }

    pub fn effective_corroborated_confidence(&self) -> f64 {
        self.corroborated_confidence
            .unwrap_or(constants::DEFAULT_CORROBORATED_CONFIDENCE)
    }

    pub fn effective_single_source_confidence(&self) -> f64 {
        self.single_source_confidence
            .unwrap_or(constants::DEFAULT_SINGLE_SOURCE_CONFIDENCE)
    }

    pub fn effective_reviews_only_confidence(&self) -> f64 {
        self.reviews_only_confidence
            .unwrap_or(constants::DEFAULT_REVIEWS_ONLY_CONFIDENCE)
    }

    pub fn effective_min_sources_for_multi(&self) -> u32 {
        self.min_sources_for_multi
            .unwrap_or(constants::DEFAULT_MIN_SOURCES_FOR_MULTI)
    }

    pub fn effective_corroboration_review_hits(&self) -> u32 {
        self.corroboration_review_hits
            .unwrap_or(constants::DEFAULT_CORROBORATION_REVIEW_HITS)
    }

    pub fn effective_reviews_only_review_hits(&self) -> u32 {
        self.reviews_only_review_hits
            .unwrap_or(constants::DEFAULT_REVIEWS_ONLY_REVIEW_HITS)
    }
}
