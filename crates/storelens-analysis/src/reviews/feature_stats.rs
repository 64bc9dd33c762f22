//! Per-(app, feature) statistics over matching reviews.

use std::collections::BTreeMap;

use serde::Serialize;

use storelens_core::types::{AppKey, ReviewRecord};

use crate::patterns::PatternLibrary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureReviewStat {
    pub app_key: AppKey,
    pub review_hits: u64,
    /// Mean star rating of matching reviews that have one.
    pub avg_rating: Option<f64>,
    /// Mean sentiment score of matching reviews that have one.
    pub mean_compound: Option<f64>,
    pub feature: String,
}

#[derive(Default)]
struct Acc {
    hits: u64,
    rating_sum: f64,
    rating_n: u64,
    score_sum: f64,
    score_n: u64,
}

fn mean(sum: f64, n: u64) -> Option<f64> {
    (n > 0).then(|| sum / n as f64)
}

/// Features in library order, apps sorted by key; zero-hit pairs omitted.
pub fn feature_review_stats(
    library: &PatternLibrary,
    reviews: &[ReviewRecord],
) -> Vec<FeatureReviewStat> {
    let texts: Vec<String> = reviews
        .iter()
        .map(|r| {
            format!(
                "{} {}",
                r.title.as_deref().unwrap_or(""),
                r.body.as_deref().unwrap_or("")
            )
            .to_lowercase()
        })
        .collect();

    let mut out = Vec::new();
    for feature in library.features() {
        let mut by_app: BTreeMap<&AppKey, Acc> = BTreeMap::new();
        for (review, text) in reviews.iter().zip(&texts) {
            if !feature.is_match(text) {
                continue;
            }
            let acc = by_app.entry(&review.app_key).or_default();
            acc.hits += 1;
            if let Some(r) = review.rating {
                acc.rating_sum += r;
                acc.rating_n += 1;
            }
            if let Some(s) = review.sentiment_score {
                acc.score_sum += s;
                acc.score_n += 1;
            }
        }
        out.extend(by_app.into_iter().map(|(key, acc)| FeatureReviewStat {
            app_key: key.clone(),
            review_hits: acc.hits,
            avg_rating: mean(acc.rating_sum, acc.rating_n),
            mean_compound: mean(acc.score_sum, acc.score_n),
            feature: feature.name().to_string(),
        }));
    }
    out
}
