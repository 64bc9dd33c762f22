//! Feature flagging end to end: library, evidence, corpus, scorer, driver.

use storelens_analysis::confidence::{ConfidenceScorer, EvidenceTier, ScoringPolicy};
use storelens_analysis::flags::FeatureFlagDriver;
use storelens_analysis::patterns::PatternLibrary;
use storelens_analysis::reviews::ReviewCorpus;
use storelens_core::config::ScoringConfig;
use storelens_core::types::{AppKey, AppRecord, FxHashMap, ReviewRecord};

fn app(key: &str, title: &str, description: &str) -> AppRecord {
    let mut a = AppRecord::new(key);
    a.title = Some(title.to_string());
    a.description = Some(description.to_string());
    a
}

fn reviews(key: &str, text: &str, n: usize) -> Vec<ReviewRecord> {
    (0..n)
        .map(|_| {
            let mut r = ReviewRecord::new(key);
            r.body = Some(text.to_string());
            r
        })
        .collect()
}

#[test]
fn test_multi_source_scores_080() {
    let lib = PatternLibrary::builtin().unwrap();
    let driver = FeatureFlagDriver::new(&lib, ConfidenceScorer::default());
    let apps = vec![app("play:a", "pomodoro focus", "classic pomodoro sessions")];
    let run = driver
        .run_feature("pomodoro", &apps, &FxHashMap::default(), &ReviewCorpus::default())
        .unwrap();
    assert_eq!(run.flagged(), 1);
    let label = &run.labels[0];
    assert_eq!(label.confidence, 0.80);
    assert_eq!(label.tier, EvidenceTier::MultiSource);
    assert_eq!(label.signals(), "title,description");
    assert_eq!(label.review_hits, 0);
}

#[test]
fn test_website_text_is_a_source() {
    let lib = PatternLibrary::builtin().unwrap();
    let driver = FeatureFlagDriver::new(&lib, ConfidenceScorer::default());
    let apps = vec![app("play:a", "Zen", "calm")];
    let mut websites = FxHashMap::default();
    websites.insert(AppKey::new("play:a"), "try our pomodoro method".to_string());
    let run = driver
        .run_feature("pomodoro", &apps, &websites, &ReviewCorpus::default())
        .unwrap();
    assert_eq!(run.labels[0].signals(), "website");
    assert_eq!(run.labels[0].confidence, 0.60);
}

#[test]
fn test_single_source_corroborated_by_ten_reviews() {
    let lib = PatternLibrary::builtin().unwrap();
    let driver = FeatureFlagDriver::new(&lib, ConfidenceScorer::default());
    let apps = vec![app("play:a", "pomodoro", "calm")];
    let corpus = ReviewCorpus::from_reviews(&reviews("play:a", "love the pomodoro", 10));
    let run = driver
        .run_feature("pomodoro", &apps, &FxHashMap::default(), &corpus)
        .unwrap();
    assert_eq!(run.labels[0].confidence, 0.70);
    assert_eq!(run.labels[0].review_hits, 10);
}

#[test]
fn test_reviews_only_boundary() {
    let lib = PatternLibrary::builtin().unwrap();
    let driver = FeatureFlagDriver::new(&lib, ConfidenceScorer::default());
    let apps = vec![app("play:a", "Zen", "calm"), app("play:b", "Om", "calm")];
    let mut all = reviews("play:a", "pomodoro works", 24);
    all.extend(reviews("play:b", "pomodoro works", 25));
    let corpus = ReviewCorpus::from_reviews(&all);
    let run = driver
        .run_feature("pomodoro", &apps, &FxHashMap::default(), &corpus)
        .unwrap();
    assert_eq!(run.flagged(), 1);
    assert_eq!(run.labels[0].app_key.as_str(), "play:b");
    assert_eq!(run.labels[0].confidence, 0.55);
    assert_eq!(run.labels[0].signals(), "reviews");
}

#[test]
fn test_word_boundaries_hold() {
    let lib = PatternLibrary::builtin().unwrap();
    let driver = FeatureFlagDriver::new(&lib, ConfidenceScorer::default());
    let apps = vec![app("play:a", "blockchain wallet", "crypto blockchains")];
    let run = driver
        .run_feature("blocking", &apps, &FxHashMap::default(), &ReviewCorpus::default())
        .unwrap();
    assert_eq!(run.flagged(), 0);
    assert_eq!(run.total_apps, 1);
}

#[test]
fn test_run_all_follows_library_order() {
    let lib = PatternLibrary::builtin().unwrap();
    let driver = FeatureFlagDriver::new(&lib, ConfidenceScorer::default());
    let runs = driver.run_all(&[], &FxHashMap::default(), &ReviewCorpus::default());
    let names: Vec<&str> = runs.iter().map(|r| r.feature.as_str()).collect();
    let expected: Vec<&str> = lib.names().collect();
    assert_eq!(names, expected);
    assert!(runs.iter().all(|r| r.labels.is_empty()));
}

#[test]
fn test_policy_from_config_overrides() {
    let config = ScoringConfig {
        reviews_only_review_hits: Some(3),
        ..Default::default()
    };
    let lib = PatternLibrary::builtin().unwrap();
    let driver = FeatureFlagDriver::new(&lib, ConfidenceScorer::new(ScoringPolicy::from_config(&config)));
    let apps = vec![app("play:a", "Zen", "calm")];
    let corpus = ReviewCorpus::from_reviews(&reviews("play:a", "pomodoro", 3));
    let run = driver
        .run_feature("pomodoro", &apps, &FxHashMap::default(), &corpus)
        .unwrap();
    assert_eq!(run.flagged(), 1);
}

#[test]
fn test_custom_library_from_toml() {
    let lib = PatternLibrary::from_toml_str(
        "[[features]]\nname = \"streaks\"\npatterns = ['\\bstreaks?\\b']\n",
    )
    .unwrap();
    assert_eq!(lib.len(), 1);
    assert!(lib.require("streaks").is_ok());
    assert!(lib.require("pomodoro").is_err());
}

#[test]
fn test_pattern_file_replaces_builtin_library() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patterns.toml");
    std::fs::write(
        &path,
        "[[features]]\nname = \"streaks\"\npatterns = ['\\bstreaks?\\b']\n",
    )
    .unwrap();
    let lib = PatternLibrary::load(Some(&path)).unwrap();
    assert_eq!(lib.names().collect::<Vec<_>>(), vec!["streaks"]);
    assert!(PatternLibrary::load(Some(&dir.path().join("missing.toml"))).is_err());
    assert!(PatternLibrary::load(None).unwrap().len() > 10);
}
