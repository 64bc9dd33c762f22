//! Bundle: the long table left-joined with app metadata and per-app
//! sentiment on `app_key`.

use serde::Serialize;

use storelens_core::types::{AppKey, AppRecord, FxHashMap};

use super::long::LongRow;
use crate::sentiment::CollapsedSentiment;

/// The app columns carried into the bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppSubset {
    pub store: Option<String>,
    pub title: Option<String>,
    pub rating_avg: Option<f64>,
    pub rating_count: Option<u64>,
    pub installs_or_users: Option<u64>,
    pub relevance_score: Option<f64>,
}

impl From<&AppRecord> for AppSubset {
    fn from(app: &AppRecord) -> Self {
        Self {
            store: app.store.as_ref().map(|s| s.name().to_string()),
            title: app.title.clone(),
            rating_avg: app.rating_avg,
            rating_count: app.rating_count,
            installs_or_users: app.installs_or_users,
            relevance_score: app.relevance_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleRow {
    pub long: LongRow,
    /// `None` when the app is absent from the app table.
    pub app: Option<AppSubset>,
    pub sentiment: Option<CollapsedSentiment>,
}

/// Bundle rows plus which optional column groups are present.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub rows: Vec<BundleRow>,
    pub has_apps: bool,
    pub has_sentiment: bool,
}

/// Exactly one bundle row per long row.
///
/// Apps are keyed on their first occurrence; sentiment must already be
/// collapsed to one row per app, and a repeat keeps the first.
pub fn build_bundle(
    long: &[LongRow],
    apps: Option<&[AppRecord]>,
    sentiment: Option<&[CollapsedSentiment]>,
) -> Bundle {
    let app_index: Option<FxHashMap<&AppKey, AppSubset>> = apps.map(|apps| {
        let mut m = FxHashMap::default();
        for a in apps {
            m.entry(&a.app_key).or_insert_with(|| AppSubset::from(a));
        }
        m
    });
    let sent_index: Option<FxHashMap<&AppKey, &CollapsedSentiment>> = sentiment.map(|rows| {
        let mut m = FxHashMap::default();
        for s in rows {
            m.entry(&s.app_key).or_insert(s);
        }
        m
    });

    let rows = long
        .iter()
        .map(|r| BundleRow {
            long: r.clone(),
            app: app_index
                .as_ref()
                .and_then(|m| m.get(&r.app_key).cloned()),
            sentiment: sent_index
                .as_ref()
                .and_then(|m| m.get(&r.app_key).map(|s| (*s).clone())),
        })
        .collect();

    Bundle {
        rows,
        has_apps: apps.is_some(),
        has_sentiment: sentiment.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(key: &str, feature: &str) -> LongRow {
        LongRow {
            app_key: AppKey::new(key),
            feature: feature.into(),
            flag: true,
            confidence: 0.8,
            review_hits: 0,
        }
    }

    #[test]
    fn test_join_does_not_duplicate_rows() {
        let rows = vec![long("play:a", "timer"), long("play:b", "timer")];
        let mut a1 = AppRecord::new("play:a");
        a1.title = Some("First".into());
        let mut a2 = AppRecord::new("play:a");
        a2.title = Some("Second".into());
        let apps = vec![a1, a2];
        let sent = vec![CollapsedSentiment {
            app_key: AppKey::new("play:a"),
            n_reviews: 4,
            ..Default::default()
        }];

        let b = build_bundle(&rows, Some(&apps), Some(&sent));
        assert_eq!(b.rows.len(), 2);
        assert_eq!(b.rows[0].app.as_ref().unwrap().title.as_deref(), Some("First"));
        assert!(b.rows[1].app.is_none());
        assert_eq!(b.rows[0].sentiment.as_ref().unwrap().n_reviews, 4);
        assert!(b.has_sentiment);
    }

    #[test]
    fn test_missing_optional_inputs() {
        let b = build_bundle(&[long("play:a", "timer")], None, None);
        assert!(!b.has_apps && !b.has_sentiment);
        assert!(b.rows[0].app.is_none());
    }
}
