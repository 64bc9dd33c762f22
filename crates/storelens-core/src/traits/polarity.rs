//! Polarity scoring seam.

use crate::types::SentimentLabel;

/// Output of a polarity engine for one text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityScore {
    /// Normalized score in roughly [-1, 1].
    pub compound: f64,
    pub label: SentimentLabel,
}

/// Text in, (score, label) out.
///
/// The lexicon engine in `storelens-analysis` is the default; any heavier
/// model with the same contract is a drop-in replacement.
pub trait PolarityEngine {
    /// Engine name, recorded in logs.
    fn name(&self) -> &str;

    fn score(&self, text: &str) -> PolarityScore;
}

/// Label a compound score with inclusive thresholds.
pub fn label_for(compound: f64, positive_threshold: f64, negative_threshold: f64) -> SentimentLabel {
    if compound >= positive_threshold {
        SentimentLabel::Positive
    } else if compound <= negative_threshold {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}
