//! Long table, pivots, and the bundle join.

use storelens_analysis::matrix::{
    assemble_long, build_bundle, flatten_flags, FeatureFile, FeatureFileRow, MatrixSet,
};
use storelens_analysis::sentiment::CollapsedSentiment;
use storelens_core::types::{AppKey, AppRecord, Store};

fn row(key: &str, conf: f64, hits: u64) -> FeatureFileRow {
    FeatureFileRow {
        app_key: AppKey::new(key),
        flag: None,
        confidence: Some(conf),
        review_hits: Some(hits),
    }
}

fn files() -> Vec<FeatureFile> {
    vec![
        FeatureFile {
            feature: "timer".into(),
            rows: vec![row("play:b", 0.8, 4), row("play:a", 0.6, 0)],
        },
        FeatureFile {
            feature: "blocking".into(),
            rows: vec![row("play:a", 0.55, 30), row("cws:z", 0.7, 1)],
        },
    ]
}

#[test]
fn test_pivot_shapes_and_values() {
    let long = assemble_long(&files(), 0.6, 0);
    assert_eq!(long.len(), 4);
    let set = MatrixSet::pivot(&long);
    assert_eq!(set.flags.features(), &["blocking".to_string(), "timer".to_string()]);
    let keys: Vec<&str> = set.flags.app_keys().map(AppKey::as_str).collect();
    assert_eq!(keys, vec!["cws:z", "play:a", "play:b"]);

    let a = AppKey::new("play:a");
    assert_eq!(set.flags.get(&a, "timer"), Some(1));
    assert_eq!(set.flags.get(&a, "blocking"), Some(0));
    assert_eq!(set.confidence.get(&a, "blocking"), Some(0.55));
    assert_eq!(set.review_hits.get(&a, "blocking"), Some(30));
    assert_eq!(set.review_hits.get(&AppKey::new("play:b"), "blocking"), Some(0));
}

#[test]
fn test_flag_threshold_on_review_hits() {
    let long = assemble_long(&files(), 0.5, 5);
    let flagged: Vec<(&str, &str)> = long
        .iter()
        .filter(|r| r.flag)
        .map(|r| (r.app_key.as_str(), r.feature.as_str()))
        .collect();
    assert_eq!(flagged, vec![("play:a", "blocking")]);
}

#[test]
fn test_flatten_recovers_flagged_pairs() {
    let long = assemble_long(&files(), 0.6, 0);
    let set = MatrixSet::pivot(&long);
    let mut pairs: Vec<(String, String)> = flatten_flags(&set.flags)
        .into_iter()
        .map(|(k, f)| (k.to_string(), f))
        .collect();
    pairs.sort();
    let mut expected: Vec<(String, String)> = long
        .iter()
        .filter(|r| r.flag)
        .map(|r| (r.app_key.to_string(), r.feature.clone()))
        .collect();
    expected.sort();
    assert_eq!(pairs, expected);
}

#[test]
fn test_bundle_left_join() {
    let long = assemble_long(&files(), 0.6, 0);
    let mut a = AppRecord::new("play:a");
    a.store = Some(Store::PlayStore);
    a.title = Some("Alpha".into());
    let mut dup = AppRecord::new("play:a");
    dup.title = Some("Alpha again".into());
    let apps = vec![a, dup];
    let sentiment = vec![CollapsedSentiment {
        app_key: AppKey::new("play:b"),
        mean_compound: Some(0.4),
        n_reviews: 7,
        ..Default::default()
    }];

    let bundle = build_bundle(&long, Some(&apps), Some(&sentiment));
    assert_eq!(bundle.rows.len(), long.len());
    assert!(bundle.has_apps && bundle.has_sentiment);

    let alpha = bundle
        .rows
        .iter()
        .find(|r| r.long.app_key.as_str() == "play:a")
        .unwrap();
    let subset = alpha.app.as_ref().unwrap();
    assert_eq!(subset.title.as_deref(), Some("Alpha"));
    assert_eq!(subset.store.as_deref(), Some("PlayStore"));
    assert!(alpha.sentiment.is_none());

    let beta = bundle
        .rows
        .iter()
        .find(|r| r.long.app_key.as_str() == "play:b")
        .unwrap();
    assert!(beta.app.is_none());
    assert_eq!(beta.sentiment.as_ref().unwrap().n_reviews, 7);
}

#[test]
fn test_bundle_without_optional_tables() {
    let long = assemble_long(&files(), 0.6, 0);
    let bundle = build_bundle(&long, None, None);
    assert!(!bundle.has_apps && !bundle.has_sentiment);
    assert!(bundle.rows.iter().all(|r| r.app.is_none() && r.sentiment.is_none()));
}
