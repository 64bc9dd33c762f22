//! Review filtering and per-review scoring.

use chrono::{DateTime, Duration, Utc};

use storelens_core::config::SentimentConfig;
use storelens_core::traits::PolarityEngine;
use storelens_core::types::ReviewRecord;

use super::text::{clean_text, compose_text};

/// Row filters, applied in order: date window, word count, character
/// count, special-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentFilter {
    /// Keep reviews at or after this instant. Reviews without a timestamp
    /// are dropped when set.
    pub since: Option<DateTime<Utc>>,
    pub min_words: usize,
    pub min_chars: usize,
    pub special_only: bool,
}

impl SentimentFilter {
    /// `since_days` is resolved against `now` so runs are reproducible.
    pub fn from_config(config: &SentimentConfig, now: DateTime<Utc>) -> Self {
        Self {
            since: config
                .since_days
                .filter(|&d| d > 0)
                .map(|d| now - Duration::days(i64::from(d))),
            min_words: config.effective_min_words(),
            min_chars: config.effective_min_chars(),
            special_only: config.effective_special_only(),
        }
    }

    fn keeps_date(&self, review: &ReviewRecord) -> bool {
        match (self.since, review.at) {
            (None, _) => true,
            (Some(cutoff), Some(at)) => at >= cutoff,
            (Some(_), None) => false,
        }
    }

    fn keeps_text(&self, text: &str) -> bool {
        (self.min_words == 0 || text.split_whitespace().count() >= self.min_words)
            && (self.min_chars == 0 || text.chars().count() >= self.min_chars)
    }
}

/// A review with its sentiment columns filled and the scored text.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredReview {
    pub review: ReviewRecord,
    pub text: String,
}

/// Filter and score. Input order is preserved.
pub fn score_reviews(
    reviews: Vec<ReviewRecord>,
    filter: &SentimentFilter,
    engine: &dyn PolarityEngine,
) -> Vec<ScoredReview> {
    let input = reviews.len();
    let scored: Vec<ScoredReview> = reviews
        .into_iter()
        .filter(|r| filter.keeps_date(r))
        .map(|r| {
            let text = clean_text(&compose_text(r.title.as_deref(), r.body.as_deref()));
            (r, text)
        })
        .filter(|(_, text)| filter.keeps_text(text))
        .filter(|(r, _)| !filter.special_only || r.special)
        .map(|(mut review, text)| {
            let score = engine.score(&text);
            review.sentiment_score = Some(score.compound);
            review.sentiment_label = Some(score.label);
            ScoredReview { review, text }
        })
        .collect();

    tracing::info!(
        engine = engine.name(),
        input,
        scored = scored.len(),
        "reviews scored"
    );
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexiconEngine;
    use chrono::TimeZone;
    use storelens_core::types::SentimentLabel;

    fn review(body: &str) -> ReviewRecord {
        let mut r = ReviewRecord::new("play:a");
        r.body = Some(body.to_string());
        r
    }

    #[test]
    fn test_filters_apply_in_order() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let config = SentimentConfig {
            since_days: Some(30),
            min_words: Some(2),
            ..Default::default()
        };
        let filter = SentimentFilter::from_config(&config, now);

        let mut recent = review("really great app");
        recent.at = Some(Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap());
        let mut old = review("really great app");
        old.at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let undated = review("really great app");
        let mut short = review("great");
        short.at = recent.at;

        let out = score_reviews(vec![recent, old, undated, short], &filter, &LexiconEngine::builtin());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "really great app");
        assert_eq!(out[0].review.sentiment_label, Some(SentimentLabel::Positive));
    }

    #[test]
    fn test_special_only() {
        let filter = SentimentFilter {
            special_only: true,
            ..Default::default()
        };
        let mut nd = review("helps my adhd");
        nd.special = true;
        let out = score_reviews(vec![nd, review("fine")], &filter, &LexiconEngine::builtin());
        assert_eq!(out.len(), 1);
        assert!(out[0].review.special);
    }

    #[test]
    fn test_composed_text_is_cleaned() {
        let mut r = review("see https://x.io  now");
        r.title = Some("Title".into());
        let out = score_reviews(vec![r], &SentimentFilter::default(), &LexiconEngine::builtin());
        assert_eq!(out[0].text, "Title. see now");
    }
}
