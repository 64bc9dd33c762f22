//! Labeler responses: classification run, parsing, flattening.

use std::cell::Cell;
use std::time::Duration;

use storelens_analysis::llm::{
    flatten_responses, parse_labels, rater_labels, ClassificationRunner, LabelResponse,
    LlmResponseRow, RunnerOptions,
};
use storelens_core::config::PromptStyle;
use storelens_core::errors::PipelineError;
use storelens_core::traits::{ClassifierRequest, FeatureClassifier};
use storelens_core::types::{AppKey, AppRecord, FxHashMap, FxHashSet};

/// Follows the presence prompt: one `{name, flag, confidence}` entry per
/// feature listed in the prompt, flagged when the description mentions it.
struct Echo {
    calls: Cell<usize>,
}

fn prompt_line<'a>(prompt: &'a str, prefix: &str) -> &'a str {
    prompt
        .lines()
        .find_map(|l| l.trim().strip_prefix(prefix))
        .unwrap_or("")
}

impl FeatureClassifier for Echo {
    fn vendor(&self) -> &str {
        "local"
    }

    fn model(&self) -> &str {
        "echo-1"
    }

    fn classify(&self, request: &ClassifierRequest<'_>) -> Result<String, String> {
        self.calls.set(self.calls.get() + 1);
        let desc = prompt_line(request.text, "- Description:").to_lowercase();
        let features = prompt_line(request.text, "Features to check:").trim_end_matches('.');
        let entries: Vec<String> = features
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| {
                let flag = desc.contains(f);
                format!(r#"{{"name": "{f}", "flag": {flag}, "confidence": 0.8, "evidence": ""}}"#)
            })
            .collect();
        Ok(format!(
            "Sure! Here you go:\n```json\n{{\"app_key\": \"{}\", \"features\": [{}]}}\n```",
            request.app_key,
            entries.join(", ")
        ))
    }
}

#[test]
fn test_classify_then_rater_labels() {
    let mut a = AppRecord::new("play:a");
    a.title = Some("Focus".into());
    a.description = Some("A timer with reminders".into());
    let mut b = AppRecord::new("play:b");
    b.description = Some("nothing relevant".into());
    let mut c = AppRecord::new("play:c");
    c.description = Some("Daily reminders only".into());

    let taxonomy = vec!["timer".to_string(), "reminders".to_string()];
    let echo = Echo { calls: Cell::new(0) };
    let options = RunnerOptions {
        max_attempts: 1,
        sleep: Duration::ZERO,
        resume: false,
        prompt: PromptStyle::Presence,
    };
    let result = ClassificationRunner::new(&echo, options).run(
        &[a, b, c],
        &FxHashMap::default(),
        &taxonomy,
        &FxHashSet::default(),
    );
    assert!(result.is_clean());
    assert_eq!(echo.calls.get(), 3);
    assert_eq!(result.data[0].rater_name(), "echo-1");

    let labels = rater_labels(&result.data);
    assert_eq!(labels.len(), 6);
    let mut present: Vec<(&str, &str)> = labels
        .iter()
        .filter(|l| l.present)
        .map(|l| (l.app_key.as_str(), l.feature.as_str()))
        .collect();
    present.sort();
    assert_eq!(
        present,
        vec![("play:a", "reminders"), ("play:a", "timer"), ("play:c", "reminders")]
    );
}

#[test]
fn test_goldilocks_answers_carry_no_presence() {
    let rows = vec![LlmResponseRow {
        app_key: AppKey::new("play:a"),
        payload: r#"{"features": ["timer"], "goldilocks_support": {"timer": "neutral"}}"#.into(),
        ..Default::default()
    }];
    assert!(rater_labels(&rows).is_empty());
    assert_eq!(flatten_responses(&rows).data.len(), 1);
}

#[test]
fn test_response_shapes() {
    let bare = parse_labels(r#"["Timer", "Streaks"]"#).unwrap();
    assert!(matches!(bare.response, LabelResponse::BareList(ref e) if e.len() == 2));

    let objects = parse_labels(
        r#"{"features": [{"feature_name": "Timer", "support": "strong_support"}]}"#,
    )
    .unwrap();
    assert_eq!(objects.response.feature_names(), vec!["Timer"]);
    assert_eq!(objects.support.support_for("timer"), "strong_support");

    let items = parse_labels(r#"{"items": [{"name": "Badges"}]}"#).unwrap();
    assert!(matches!(items.response, LabelResponse::ItemsFallback(_)));

    let empty = parse_labels(r#"{"summary": "nothing"}"#).unwrap();
    assert!(empty.response.is_empty());
}

#[test]
fn test_flatten_records_parse_errors_and_continues() {
    let rows = vec![
        LlmResponseRow {
            app_key: AppKey::new("play:a"),
            payload: "garbage {".into(),
            ..Default::default()
        },
        LlmResponseRow {
            app_key: AppKey::new("play:b"),
            payload: r#"{"features": ["Timer"], "support": "undermining"}"#.into(),
            ..Default::default()
        },
    ];
    let result = flatten_responses(&rows);
    assert_eq!(result.error_count(), 1);
    assert!(matches!(
        result.errors[0],
        PipelineError::LabelParse { ref app_key, .. } if app_key == "play:a"
    ));
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.data[1].feature_norm, "timer");
    assert_eq!(result.data[1].support, "undermining");
}
