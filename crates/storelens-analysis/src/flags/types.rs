//! Feature label rows.

use serde::Serialize;

use storelens_core::types::AppKey;

use crate::confidence::EvidenceTier;
use crate::evidence::SourceSet;

/// One rater's judgment on one (app, feature).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureLabel {
    pub app_key: AppKey,
    pub title: String,
    pub feature: String,
    pub rater: String,
    pub present: bool,
    pub confidence: f64,
    pub tier: EvidenceTier,
    pub sources: SourceSet,
    pub review_hits: u32,
}

impl FeatureLabel {
    /// Matched sources, or `reviews` for a review-only signal.
    pub fn signals(&self) -> String {
        if !self.sources.is_empty() {
            self.sources.joined()
        } else if self.review_hits > 0 {
            "reviews".to_string()
        } else {
            String::new()
        }
    }

    /// Confidence rounded to two decimals as persisted.
    pub fn rounded_confidence(&self) -> f64 {
        (self.confidence * 100.0).round() / 100.0
    }
}

/// Output of one feature over all apps.
#[derive(Debug, Clone)]
pub struct FlagRun {
    pub feature: String,
    /// Flagged rows, sorted by confidence desc, review hits desc, title asc.
    pub labels: Vec<FeatureLabel>,
    pub total_apps: usize,
}

impl FlagRun {
    pub fn flagged(&self) -> usize {
        self.labels.len()
    }
}
