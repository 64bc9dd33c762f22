//! Sentiment scoring and aggregation configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SentimentConfig {
    /// Compound score at or above which a review is positive. Default: 0.05.
    pub positive_threshold: Option<f64>,
    /// Compound score at or below which a review is negative. Default: -0.05.
    pub negative_threshold: Option<f64>,
    /// Keep only reviews from the last N days. Unset keeps everything.
    pub since_days: Option<u32>,
    /// Minimum word count of the composed text. Default: 0.
    pub min_words: Option<usize>,
    /// Minimum character count of the composed text. Default: 0.
    pub min_chars: Option<usize>,
    /// Score only reviews flagged special. Default: false.
    pub special_only: Option<bool>,
    /// Exclude neutral reviews from the aggregate. Default: false.
    pub drop_neutrals_for_agg: Option<bool>,
}

impl SentimentConfig {
    pub fn effective_positive_threshold(&self) -> f64 {
        self.positive_threshold
            .unwrap_or(constants::DEFAULT_POSITIVE_THRESHOLD)
    }

    pub fn effective_negative_threshold(&self) -> f64 {
        self.negative_threshold
            .unwrap_or(constants::DEFAULT_NEGATIVE_THRESHOLD)
    }

    pub fn effective_min_words(&self) -> usize {
        self.min_words.unwrap_or(0)
    }

    pub fn effective_min_chars(&self) -> usize {
        self.min_chars.unwrap_or(0)
    }

    pub fn effective_special_only(&self) -> bool {
        self.special_only.unwrap_or(false)
    }

    pub fn effective_drop_neutrals_for_agg(&self) -> bool {
        self.drop_neutrals_for_agg.unwrap_or(false)
    }
}
