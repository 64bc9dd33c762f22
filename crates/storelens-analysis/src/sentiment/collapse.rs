//! Collapse per-country sentiment rows into one row per app.

use std::collections::BTreeMap;

use serde::Serialize;

use storelens_core::config::SentimentWeighting;
use storelens_core::types::AppKey;

use super::aggregate::SentimentAggregate;

/// One sentiment row per `app_key`, ready for the bundle join.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollapsedSentiment {
    pub app_key: AppKey,
    pub avg_rating: Option<f64>,
    pub mean_compound: Option<f64>,
    pub pct_positive: Option<f64>,
    pub pct_negative: Option<f64>,
    pub n_reviews: u64,
    pub n_nd: u64,
}

/// Counts are summed. Means are weighted by `n_reviews` in weighted mode;
/// each metric only considers rows that carry it, and falls back to the
/// plain mean when those rows have zero total weight.
pub fn collapse_by_app(
    rows: &[SentimentAggregate],
    weighting: SentimentWeighting,
) -> Vec<CollapsedSentiment> {
    let mut by_app: BTreeMap<&AppKey, Vec<&SentimentAggregate>> = BTreeMap::new();
    for r in rows {
        by_app.entry(&r.app_key).or_default().push(r);
    }

    by_app
        .into_iter()
        .map(|(key, group)| {
            let metric = |f: fn(&SentimentAggregate) -> Option<f64>| {
                let pairs: Vec<(f64, f64)> = group
                    .iter()
                    .filter_map(|r| f(r).map(|v| (v, r.n_reviews as f64)))
                    .collect();
                match weighting {
                    SentimentWeighting::Weighted => weighted_mean(&pairs),
                    SentimentWeighting::Unweighted => plain_mean(&pairs),
                }
            };
            CollapsedSentiment {
                app_key: key.clone(),
                avg_rating: metric(|r| r.avg_rating),
                mean_compound: metric(|r| r.mean_compound),
                pct_positive: metric(|r| r.pct_positive),
                pct_negative: metric(|r| r.pct_negative),
                n_reviews: group.iter().map(|r| r.n_reviews).sum(),
                n_nd: group.iter().map(|r| r.n_nd).sum(),
            }
        })
        .collect()
}

/// `(value, weight)` pairs.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    let total: f64 = pairs.iter().map(|&(_, w)| w).sum();
    if total <= 0.0 {
        return plain_mean(pairs);
    }
    Some(pairs.iter().map(|&(v, w)| v * w).sum::<f64>() / total)
}

fn plain_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    Some(pairs.iter().map(|&(v, _)| v).sum::<f64>() / pairs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(country: &str, n: u64, rating: Option<f64>) -> SentimentAggregate {
        SentimentAggregate {
            app_key: AppKey::new("play:a"),
            country: Some(country.into()),
            n_reviews: n,
            n_nd: 1,
            avg_rating: rating,
            ..Default::default()
        }
    }

    #[test]
    fn test_weighted_collapse_uses_review_counts() {
        let rows = vec![
            row("us", 10, Some(1.0)),
            row("gb", 0, Some(5.0)),
            row("de", 90, Some(5.0)),
        ];
        let out = collapse_by_app(&rows, SentimentWeighting::Weighted);
        assert_eq!(out.len(), 1);
        assert!((out[0].avg_rating.unwrap() - 4.6).abs() < 1e-9);
        assert_eq!(out[0].n_reviews, 100);
        assert_eq!(out[0].n_nd, 3);

        let naive = collapse_by_app(&rows, SentimentWeighting::Unweighted);
        assert!((naive[0].avg_rating.unwrap() - 11.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_weight_falls_back_to_plain_mean() {
        let rows = vec![row("us", 0, Some(2.0)), row("gb", 0, Some(4.0))];
        let out = collapse_by_app(&rows, SentimentWeighting::Weighted);
        assert_eq!(out[0].avg_rating, Some(3.0));
    }

    #[test]
    fn test_missing_metric_is_none() {
        let out = collapse_by_app(&[row("us", 5, None)], SentimentWeighting::Weighted);
        assert_eq!(out[0].avg_rating, None);
        assert_eq!(out[0].mean_compound, None);
    }
}
