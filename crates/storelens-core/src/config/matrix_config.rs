//! Matrix builder configuration.

use serde::{Deserialize, Serialize};

/// How per-country sentiment rows collapse into one row per app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SentimentWeighting {
    /// Weight every metric by `n_reviews`.
    #[default]
    Weighted,
    /// Plain mean of the per-country rows.
    Unweighted,
}

impl SentimentWeighting {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weighted" => Some(Self::Weighted),
            "unweighted" | "mean" => Some(Self::Unweighted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatrixConfig {
    /// Minimum confidence for a label row without an explicit flag. Default: 0.0.
    pub min_confidence: Option<f64>,
    /// Minimum review hits for a label row without an explicit flag. Default: 0.
    pub min_review_hits: Option<u32>,
    /// Sentiment collapse mode for the bundle. Default: weighted.
    pub sentiment_weighting: Option<SentimentWeighting>,
}

impl MatrixConfig {
    pub fn effective_min_confidence(&self) -> f64 {
        self.min_confidence.unwrap_or(0.0)
    }

    pub fn effective_min_review_hits(&self) -> u32 {
        self.min_review_hits.unwrap_or(0)
    }

    pub fn effective_sentiment_weighting(&self) -> SentimentWeighting {
        self.sentiment_weighting.unwrap_or_default()
    }
}
