//! Stage commands end to end over temp directories.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use storelens_cli::commands::{
    AgreementArgs, CleanArgs, ClassifyArgs, DedupReviewsArgs, FlagsArgs, FlattenLlmArgs,
    MatrixArgs, NormalizeArgs, SentimentArgs,
};
use storelens_cli::{Cli, Command};
use storelens_analysis::llm::LlmResponseRow;
use storelens_core::config::{PromptStyle, StorelensConfig};
use storelens_core::types::AppKey;
use storelens_storage::tables::llm::write_llm_responses;
use storelens_core::errors::StorelensErrorCode;

const APPS: &str = "app_key,store,id,title,description\n\
                    play:a,PlayStore,a,Focus,Block distracting websites\n\
                    play:b,PlayStore,b,Cook,Recipes for dinner\n";

fn write(path: &Path, content: &str) -> PathBuf {
    fs::write(path, content).unwrap();
    path.to_path_buf()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn flags_args(apps: PathBuf, feature: &str) -> FlagsArgs {
    FlagsArgs {
        apps,
        web: None,
        reviews: None,
        feature: feature.into(),
        out: None,
        out_dir: None,
        patterns: None,
    }
}

#[test]
fn normalize_then_clean_splits_kept_and_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(
        &dir.path().join("raw.jsonl"),
        "{\"store\":\"PlayStore\",\"id\":\"com.a\",\"title\":\"Focus Timer\",\"description\":\"Stay focused\",\"ratingCount\":\"1,200\"}\n\
         {\"store\":\"PlayStore\",\"id\":\"com.b\"}\n\
         oops\n",
    );
    let apps = dir.path().join("apps_all.csv");
    let summary = Command::Normalize(NormalizeArgs {
        input: raw,
        out: apps.clone(),
        include_terms: vec![],
        exclude_terms: vec![],
    })
    .run(&StorelensConfig::default())
    .unwrap();
    assert!(summary.starts_with("[normalize] 2 apps (1 malformed skipped)"));

    let mut config = StorelensConfig::default();
    config.cleaning.min_relevance = Some(0.0);
    let kept = dir.path().join("apps_clean.csv");
    let summary = Command::Clean(CleanArgs {
        input: apps,
        out: kept.clone(),
        out_dropped: None,
        min_rating_count: None,
        min_play_installs: None,
        min_cws_users: None,
        min_relevance: None,
    })
    .run(&config)
    .unwrap();
    assert!(summary.starts_with("[clean] kept 1, dropped 1"));
    assert!(read(&kept).contains("play:com.a"));
    let dropped = read(&dir.path().join("apps_dropped.csv"));
    assert!(dropped.contains("play:com.b"));
    assert!(dropped.contains("missing_title_and_description"));
}

#[test]
fn dedup_merges_inputs_by_review_id() {
    let dir = tempfile::tempdir().unwrap();
    let table = "app_key,review_id,title,body,rating\nplay:a,r1,Nice,Works well,5\n";
    let a = write(&dir.path().join("a.csv"), table);
    let b = write(&dir.path().join("b.csv"), table);
    let out = dir.path().join("reviews.csv");
    let summary = Command::DedupReviews(DedupReviewsArgs {
        inputs: vec![a, b],
        out: out.clone(),
        dedupe_scope: None,
    })
    .run(&StorelensConfig::default())
    .unwrap();
    assert!(summary.starts_with("[reviews] 2 -> 1 reviews (1 duplicate ids"));
    assert_eq!(read(&out).lines().count(), 2);
}

#[test]
fn sentiment_writes_scored_rows_and_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        &dir.path().join("reviews.csv"),
        "app_key,country,title,body,rating\n\
         play:a,us,Love it,This app is great and helpful,5\n\
         play:a,us,Bad,Terrible and awful crashes,1\n",
    );
    let out_reviews = dir.path().join("scored.csv");
    let out_apps = dir.path().join("app_sentiment.csv");
    let summary = Command::Sentiment(SentimentArgs {
        input,
        out_reviews: out_reviews.clone(),
        out_apps: out_apps.clone(),
        since_days: None,
        min_words: None,
        min_chars: None,
        special_only: false,
        drop_neutrals: false,
    })
    .run(&StorelensConfig::default())
    .unwrap();
    assert!(summary.starts_with("[sentiment] scored 2/2 reviews, 1 aggregate rows"));
    assert!(read(&out_reviews).lines().next().unwrap().ends_with("sentiment_score,sentiment_label,text"));
    assert!(read(&out_apps).contains("play:a,,us,2,"));
}

#[test]
fn flags_single_feature_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let apps = write(&dir.path().join("apps.csv"), APPS);
    let summary = Command::Flags(flags_args(apps, "blocking"))
        .run(&StorelensConfig::default())
        .unwrap();
    let out = dir.path().join("features_blocking.csv");
    assert_eq!(
        summary,
        format!("[features] blocking: 1/2 apps flagged -> {}", out.display())
    );
    let content = read(&out);
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains("play:a,Focus,"));
}

#[test]
fn flags_unknown_feature_is_reported_by_code() {
    let dir = tempfile::tempdir().unwrap();
    let apps = write(&dir.path().join("apps.csv"), APPS);
    let err = Command::Flags(flags_args(apps, "teleportation"))
        .run(&StorelensConfig::default())
        .unwrap_err();
    assert!(err.diagnostic().starts_with("[UNKNOWN_FEATURE]"));
}

#[test]
fn missing_required_input_is_reported_by_code() {
    let dir = tempfile::tempdir().unwrap();
    let err = Command::Flags(flags_args(dir.path().join("nope.csv"), "blocking"))
        .run(&StorelensConfig::default())
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_INPUT");
}

#[test]
fn flags_then_matrix_builds_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let apps = write(&dir.path().join("apps.csv"), APPS);
    let labels = dir.path().join("labels");
    let mut args = flags_args(apps.clone(), "all");
    args.out_dir = Some(labels.clone());
    Command::Flags(args).run(&StorelensConfig::default()).unwrap();
    assert!(labels.join("features_blocking.csv").is_file());

    let summary = Command::Matrix(MatrixArgs {
        in_dir: labels.clone(),
        out_dir: None,
        min_confidence: None,
        min_review_hits: None,
        bundle_apps: true,
        apps_csv: Some(apps),
        bundle_sent: true,
        sent_csv: None,
        sentiment_weighting: None,
    })
    .run(&StorelensConfig::default())
    .unwrap();
    assert!(summary.starts_with("[matrix]"));

    for name in [
        "features_matrix_flags.csv",
        "features_matrix_confidence.csv",
        "features_matrix_review_hits.csv",
        "features_long.csv",
        "features_bundle.csv",
    ] {
        assert!(labels.join(name).is_file(), "{name} missing");
    }
    assert!(read(&labels.join("features_long.csv")).contains("play:a,blocking,1,"));
    let bundle = read(&labels.join("features_bundle.csv"));
    let header = bundle.lines().next().unwrap();
    assert!(header.ends_with(",relevance_score"));
    assert!(bundle.contains(",Focus,"));
}

#[test]
fn flags_all_is_byte_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let apps = write(&dir.path().join("apps.csv"), APPS);
    let reviews = write(
        &dir.path().join("reviews.csv"),
        "app_key,title,body,rating\nplay:a,Timer,The pomodoro timer blocks sites,5\nplay:b,Meh,Good recipes,3\n",
    );
    let snapshot = |name: &str| {
        let out_dir = dir.path().join(name);
        let mut args = flags_args(apps.clone(), "all");
        args.reviews = Some(reviews.clone());
        args.out_dir = Some(out_dir.clone());
        Command::Flags(args).run(&StorelensConfig::default()).unwrap();
        let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(&out_dir)
            .unwrap()
            .map(|e| {
                let path = e.unwrap().path();
                let name = path.file_name().unwrap().to_string_lossy().to_string();
                (name, fs::read(&path).unwrap())
            })
            .collect();
        files.sort();
        files
    };
    let first = snapshot("run1");
    let second = snapshot("run2");
    assert!(first.len() > 1);
    assert_eq!(first, second);
}

#[test]
fn sentiment_join_leaves_matrices_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let apps = write(&dir.path().join("apps.csv"), APPS);
    let labels = dir.path().join("labels");
    let mut args = flags_args(apps, "all");
    args.out_dir = Some(labels.clone());
    Command::Flags(args).run(&StorelensConfig::default()).unwrap();
    let header_only = write(
        &dir.path().join("app_sentiment.csv"),
        "app_key,store,country,n_reviews,n_nd,avg_rating,mean_compound,pct_positive,pct_negative\n",
    );

    let matrix = |out: &str, sent_csv: PathBuf| {
        let out_dir = dir.path().join(out);
        Command::Matrix(MatrixArgs {
            in_dir: labels.clone(),
            out_dir: Some(out_dir.clone()),
            min_confidence: None,
            min_review_hits: None,
            bundle_apps: false,
            apps_csv: None,
            bundle_sent: true,
            sent_csv: Some(sent_csv),
            sentiment_weighting: None,
        })
        .run(&StorelensConfig::default())
        .unwrap();
        out_dir
    };
    let without = matrix("without", dir.path().join("missing_sentiment.csv"));
    let with = matrix("with", header_only);

    for name in [
        "features_matrix_flags.csv",
        "features_matrix_confidence.csv",
        "features_matrix_review_hits.csv",
        "features_long.csv",
    ] {
        assert_eq!(fs::read(without.join(name)).unwrap(), fs::read(with.join(name)).unwrap(), "{name}");
    }
    let bundle_without = read(&without.join("features_bundle.csv"));
    assert_eq!(
        bundle_without.lines().next().unwrap(),
        "app_key,feature,flag,confidence,review_hits"
    );
    let bundle_with = read(&with.join("features_bundle.csv"));
    assert!(bundle_with.lines().next().unwrap().ends_with(",n_reviews,n_nd"));
}

#[test]
fn agreement_scores_every_rater_pair() {
    let dir = tempfile::tempdir().unwrap();
    let raters = write(
        &dir.path().join("raters.csv"),
        "app_key,feature,rater,present\n\
         play:a,timer,gpt,1\nplay:b,timer,gpt,1\nplay:c,timer,gpt,0\nplay:d,timer,gpt,0\n\
         play:a,timer,heuristic,1\nplay:b,timer,heuristic,0\nplay:c,timer,heuristic,0\nplay:d,timer,heuristic,0\n",
    );
    let human = write(
        &dir.path().join("human.csv"),
        "app_key,feature,present\nplay:a,timer,1\nplay:b,timer,1\nplay:c,timer,0\nplay:d,timer,1\n",
    );
    let out = dir.path().join("agreement.csv");
    let summary = Command::Agreement(AgreementArgs {
        input: Some(raters),
        llm: vec![],
        long: None,
        apps: None,
        patterns: None,
        human: Some(human),
        out: out.clone(),
    })
    .run(&StorelensConfig::default())
    .unwrap();
    assert!(summary.starts_with("[agreement] 3 rater pairs from 3 raters"));
    let content = read(&out);
    assert!(content.contains("gpt,heuristic,0.500,4,0.750,"));
}

#[test]
fn agreement_counts_unflagged_apps_as_heuristic_absences() {
    let dir = tempfile::tempdir().unwrap();
    let apps = write(
        &dir.path().join("apps.csv"),
        "app_key,title\nplay:a,A\nplay:b,B\nplay:c,C\nplay:d,D\nplay:e,E\n",
    );
    // Feature files only carry flagged apps.
    let long = write(
        &dir.path().join("features_long.csv"),
        "app_key,feature,flag,confidence,review_hits\nplay:a,blocking,1,0.6,0\nplay:c,blocking,1,0.6,0\n",
    );
    let responses: Vec<LlmResponseRow> = [("a", true), ("b", true), ("c", true), ("d", false), ("e", false)]
        .into_iter()
        .map(|(id, flag)| LlmResponseRow {
            app_key: AppKey::new(&format!("play:{id}")),
            model: Some("gpt".into()),
            payload: format!(r#"{{"features":[{{"name":"blocking","flag":{flag},"confidence":0.8}}]}}"#),
            ..Default::default()
        })
        .collect();
    let llm = dir.path().join("responses.csv");
    write_llm_responses(&llm, &responses).unwrap();

    let run = |apps: Option<PathBuf>| {
        let out = dir.path().join("agreement.csv");
        let summary = Command::Agreement(AgreementArgs {
            input: None,
            llm: vec![llm.clone()],
            long: Some(long.clone()),
            apps,
            patterns: None,
            human: None,
            out: out.clone(),
        })
        .run(&StorelensConfig::default())
        .unwrap();
        (summary, read(&out))
    };

    // gpt 1,1,1,0,0 vs heuristic 1,0,1,0,0: po = 0.8, pe = 0.48
    let (summary, content) = run(Some(apps));
    assert!(summary.starts_with("[agreement] 1 rater pairs from 2 raters"));
    assert!(content.contains("gpt,heuristic,0.615,5,0.800,"), "{content}");

    let (_, content) = run(None);
    assert!(content.contains("gpt,heuristic,0.615,5,0.800,"), "{content}");
}

#[test]
fn agreement_needs_a_rater_source() {
    assert!(Cli::try_parse_from(["storelens", "agreement", "--out", "a.csv"]).is_err());
    assert!(Cli::try_parse_from(["storelens", "agreement", "--long", "l.csv", "--out", "a.csv"]).is_ok());
}

#[test]
fn classify_parses_trailing_command() {
    let cli = Cli::try_parse_from([
        "storelens", "classify", "--apps", "a.csv", "--out", "o.csv", "--vendor", "local",
        "--model", "m", "--resume", "--prompt", "presence", "--timeout-ms", "500", "--", "sh",
        "-c", "cat",
    ])
    .unwrap();
    let Command::Classify(args) = &cli.command else {
        panic!("expected classify");
    };
    assert_eq!(args.command, vec!["sh", "-c", "cat"]);
    let overrides = cli.command.overrides();
    assert_eq!(overrides.resume, Some(true));
    assert_eq!(overrides.prompt, Some(PromptStyle::Presence));
    assert_eq!(overrides.timeout_ms, Some(500));

    assert!(Cli::try_parse_from([
        "storelens", "classify", "--apps", "a.csv", "--out", "o.csv", "--vendor", "local",
        "--model", "m", "--prompt", "yesno", "--", "true",
    ])
    .is_err());
}

#[cfg(unix)]
#[test]
fn classify_then_flatten_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let apps = write(&dir.path().join("apps.csv"), APPS);
    let responses = dir.path().join("responses.csv");
    let mut config = StorelensConfig::default();
    config.llm.sleep_ms = Some(0);

    let classify = |resume: bool, config: &StorelensConfig| {
        Command::Classify(ClassifyArgs {
            apps: apps.clone(),
            web: None,
            out: responses.clone(),
            vendor: "local".into(),
            model: "scripted".into(),
            features: vec!["timer".into(), "blocking".into()],
            patterns: None,
            max_attempts: None,
            sleep_ms: None,
            timeout_ms: None,
            prompt: None,
            resume,
            command: vec![
                "sh".into(),
                "-c".into(),
                "cat >/dev/null; echo '[\"Timer\", \"blocking\"]'".into(),
            ],
        })
        .run(config)
        .unwrap()
    };

    let summary = classify(false, &config);
    assert!(summary.contains("2 responses, 0 failed"));

    config.llm.resume = Some(true);
    let summary = classify(true, &config);
    assert!(summary.contains("0 responses, 0 failed, 2 already done"));
    assert_eq!(read(&responses).lines().count(), 3);

    let flat = dir.path().join("flat.csv");
    let summary = Command::FlattenLlm(FlattenLlmArgs {
        input: responses,
        out: flat.clone(),
        out_raters: None,
    })
    .run(&StorelensConfig::default())
    .unwrap();
    assert!(summary.starts_with("[llm] 2 responses -> 4 feature rows (0 unparsed)"));
    assert!(read(&flat).contains("play:a,Focus,local,scripted,Timer,timer,"));
}

#[test]
fn classify_skips_vendor_without_key() {
    std::env::remove_var("OPENAI_API_KEY");
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("responses.csv");
    let summary = Command::Classify(ClassifyArgs {
        apps: dir.path().join("apps.csv"),
        web: None,
        out: out.clone(),
        vendor: "openai".into(),
        model: "gpt-4o".into(),
        features: vec![],
        patterns: None,
        max_attempts: None,
        sleep_ms: None,
        timeout_ms: None,
        prompt: None,
        resume: false,
        command: vec!["true".into()],
    })
    .run(&StorelensConfig::default())
    .unwrap();
    assert_eq!(summary, "[classify] openai: skipped, no API key");
    assert!(!out.exists());
}
