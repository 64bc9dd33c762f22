//! Sequential classification driver.
//!
//! One call per app with a fixed politeness delay between calls and a
//! bounded attempt budget. Resume skips app_keys already written. A
//! failed app is logged and recorded; the run continues.

use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use storelens_core::config::{LlmConfig, PromptStyle};
use storelens_core::errors::{PipelineError, PipelineResult};
use storelens_core::traits::{ClassifierRequest, FeatureClassifier};
use storelens_core::types::{AppKey, AppRecord, FxHashMap, FxHashSet};

use super::flatten::LlmResponseRow;
use super::prompt::{render_prompt_for, PromptFields};
use super::response::extract_json;

const SUMMARY_FALLBACK_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    pub max_attempts: u32,
    pub sleep: Duration,
    pub resume: bool,
    pub prompt: PromptStyle,
}

impl RunnerOptions {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_attempts: config.effective_max_attempts(),
            sleep: Duration::from_millis(config.effective_sleep_ms()),
            resume: config.effective_resume(),
            prompt: config.effective_prompt(),
        }
    }
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

pub struct ClassificationRunner<'a> {
    classifier: &'a dyn FeatureClassifier,
    options: RunnerOptions,
}

impl<'a> ClassificationRunner<'a> {
    pub fn new(classifier: &'a dyn FeatureClassifier, options: RunnerOptions) -> Self {
        Self { classifier, options }
    }

    /// Classify every app not in `done` (when resuming), in input order.
    pub fn run(
        &self,
        apps: &[AppRecord],
        websites: &FxHashMap<AppKey, String>,
        taxonomy: &[String],
        done: &FxHashSet<AppKey>,
    ) -> PipelineResult<Vec<LlmResponseRow>> {
        let mut result: PipelineResult<Vec<LlmResponseRow>> = PipelineResult::default();
        let mut calls = 0usize;
        let mut skipped = 0usize;

        for app in apps {
            if self.options.resume && done.contains(&app.app_key) {
                skipped += 1;
                continue;
            }
            let title = app.title.as_deref().unwrap_or("");
            let prompt = render_prompt_for(
                self.options.prompt,
                &PromptFields {
                    app_key: app.app_key.as_str(),
                    title,
                    website_text: websites.get(&app.app_key).map(String::as_str).unwrap_or(""),
                    description: app.description.as_deref().unwrap_or(""),
                    taxonomy,
                },
            );
            let request = ClassifierRequest {
                app_key: &app.app_key,
                title,
                text: &prompt,
                taxonomy,
            };

            if calls > 0 && !self.options.sleep.is_zero() {
                thread::sleep(self.options.sleep);
            }
            calls += 1;

            match self.call_with_attempts(&request) {
                Ok(raw) => result.data.push(LlmResponseRow {
                    app_key: app.app_key.clone(),
                    title: app.title.clone(),
                    vendor: Some(self.classifier.vendor().to_string()),
                    model: Some(self.classifier.model().to_string()),
                    payload: normalized_payload(&raw),
                    raw: Some(raw),
                }),
                Err(message) => {
                    tracing::warn!(
                        app_key = %app.app_key,
                        vendor = self.classifier.vendor(),
                        attempts = self.options.max_attempts,
                        error = %message,
                        "classification failed"
                    );
                    result.add_error(PipelineError::ExternalCall {
                        item: app.app_key.to_string(),
                        attempts: self.options.max_attempts,
                        message,
                    });
                }
            }
        }

        tracing::info!(
            vendor = self.classifier.vendor(),
            model = self.classifier.model(),
            classified = result.data.len(),
            skipped,
            failed = result.error_count(),
            "classification run finished"
        );
        result
    }

    fn call_with_attempts(&self, request: &ClassifierRequest<'_>) -> Result<String, String> {
        let mut last = String::new();
        for attempt in 1..=self.options.max_attempts.max(1) {
            match self.classifier.classify(request) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::debug!(app_key = %request.app_key, attempt, error = %e, "classifier attempt failed");
                    last = e;
                }
            }
        }
        Err(last)
    }
}

/// The extracted JSON re-serialized, or an empty result carrying the
/// leading text as its summary.
fn normalized_payload(raw: &str) -> String {
    let value = extract_json(raw).unwrap_or_else(|_| {
        let summary: String = raw.chars().take(SUMMARY_FALLBACK_CHARS).collect();
        json!({"features": [], "goldilocks_support": {}, "summary": summary})
    });
    match value {
        Value::Null => String::new(),
        v => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Scripted {
        replies: RefCell<Vec<Result<String, String>>>,
        seen: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, String>>) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().rev().collect()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl FeatureClassifier for Scripted {
        fn vendor(&self) -> &str {
            "test"
        }
        fn model(&self) -> &str {
            "scripted"
        }
        fn classify(&self, request: &ClassifierRequest<'_>) -> Result<String, String> {
            self.seen.borrow_mut().push(request.app_key.to_string());
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err("exhausted".into()))
        }
    }

    fn options(resume: bool) -> RunnerOptions {
        RunnerOptions {
            max_attempts: 2,
            sleep: Duration::ZERO,
            resume,
            prompt: PromptStyle::Goldilocks,
        }
    }

    fn app(key: &str) -> AppRecord {
        let mut a = AppRecord::new(key);
        a.title = Some(key.to_uppercase());
        a
    }

    #[test]
    fn test_retries_then_records_failure() {
        let c = Scripted::new(vec![
            Err("timeout".into()),
            Ok("```json\n{\"features\": [\"Timer\"]}\n```".into()),
            Err("500".into()),
            Err("500".into()),
        ]);
        let runner = ClassificationRunner::new(&c, options(false));
        let result = runner.run(
            &[app("play:a"), app("play:b")],
            &FxHashMap::default(),
            &[],
            &FxHashSet::default(),
        );
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].payload, r#"{"features":["Timer"]}"#);
        assert_eq!(result.error_count(), 1);
        assert_eq!(c.seen.borrow().len(), 4);
    }

    #[test]
    fn test_resume_skips_done_keys() {
        let c = Scripted::new(vec![Ok("{}".into())]);
        let runner = ClassificationRunner::new(&c, options(true));
        let done: FxHashSet<AppKey> = [AppKey::new("play:a")].into_iter().collect();
        let result = runner.run(&[app("play:a"), app("play:b")], &FxHashMap::default(), &[], &done);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].app_key.as_str(), "play:b");
    }

    #[test]
    fn test_prose_reply_falls_back_to_summary() {
        let payload = normalized_payload("I cannot tell.");
        let v: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(v["summary"], "I cannot tell.");
        assert_eq!(v["features"], json!([]));
    }
}
