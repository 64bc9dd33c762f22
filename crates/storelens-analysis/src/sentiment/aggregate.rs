//! Per-(app, store, country) sentiment aggregates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storelens_core::types::{AppKey, SentimentLabel};

use super::scoring::ScoredReview;

/// One aggregate row. Means are `None` when no row carried the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentAggregate {
    pub app_key: AppKey,
    pub store: Option<String>,
    pub country: Option<String>,
    pub n_reviews: u64,
    /// Reviews flagged special.
    pub n_nd: u64,
    pub avg_rating: Option<f64>,
    pub mean_compound: Option<f64>,
    /// Fraction of rows labeled positive, in [0, 1].
    pub pct_positive: Option<f64>,
    pub pct_negative: Option<f64>,
}

#[derive(Default)]
struct Acc {
    n: u64,
    nd: u64,
    rating_sum: f64,
    rating_n: u64,
    score_sum: f64,
    score_n: u64,
    pos: u64,
    neg: u64,
}

type GroupKey = (AppKey, Option<String>, Option<String>);

/// Group scored reviews by (app_key, store, country), sorted by key.
/// `drop_neutrals` removes neutral rows from the aggregate only.
pub fn aggregate(scored: &[ScoredReview], drop_neutrals: bool) -> Vec<SentimentAggregate> {
    let mut groups: BTreeMap<GroupKey, Acc> = BTreeMap::new();
    for s in scored {
        let r = &s.review;
        if drop_neutrals && r.sentiment_label == Some(SentimentLabel::Neutral) {
            continue;
        }
        let acc = groups
            .entry((r.app_key.clone(), r.store.clone(), r.country.clone()))
            .or_default();
        acc.n += 1;
        acc.nd += u64::from(r.special);
        if let Some(rating) = r.rating {
            acc.rating_sum += rating;
            acc.rating_n += 1;
        }
        if let Some(score) = r.sentiment_score {
            acc.score_sum += score;
            acc.score_n += 1;
        }
        match r.sentiment_label {
            Some(SentimentLabel::Positive) => acc.pos += 1,
            Some(SentimentLabel::Negative) => acc.neg += 1,
            _ => {}
        }
    }

    groups
        .into_iter()
        .map(|((app_key, store, country), acc)| SentimentAggregate {
            app_key,
            store,
            country,
            n_reviews: acc.n,
            n_nd: acc.nd,
            avg_rating: ratio(acc.rating_sum, acc.rating_n),
            mean_compound: ratio(acc.score_sum, acc.score_n),
            pct_positive: ratio(acc.pos as f64, acc.n),
            pct_negative: ratio(acc.neg as f64, acc.n),
        })
        .collect()
}

fn ratio(sum: f64, n: u64) -> Option<f64> {
    (n > 0).then(|| sum / n as f64)
}
