//! Raw labeler responses flattened into long rows.

use serde::{Deserialize, Serialize};

use storelens_core::errors::{PipelineError, PipelineResult};
use storelens_core::types::{AppKey, FxHashSet};

use super::response::{normalize_feature, parse_labels, ParsedLabels, DEFAULT_SUPPORT};
use crate::agreement::RaterLabel;

/// One response per app from one vendor/model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponseRow {
    pub app_key: AppKey,
    pub title: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    /// The JSON payload, or the whole model text when no JSON column exists.
    pub payload: String,
    /// Unparsed model output, kept for audit.
    pub raw: Option<String>,
}

impl LlmResponseRow {
    /// `model`, else `vendor`, else `llm`.
    pub fn rater_name(&self) -> &str {
        [self.model.as_deref(), self.vendor.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or("llm")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatFeatureRow {
    pub app_key: AppKey,
    pub title: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub feature: String,
    pub feature_norm: String,
    pub support: String,
}

impl FlatFeatureRow {
    fn from_row(row: &LlmResponseRow, feature: &str, support: &str) -> Self {
        Self {
            app_key: row.app_key.clone(),
            title: row.title.clone(),
            vendor: row.vendor.clone(),
            model: row.model.clone(),
            feature: feature.to_string(),
            feature_norm: normalize_feature(feature),
            support: support.to_string(),
        }
    }
}

fn parse_row(row: &LlmResponseRow, result: &mut PipelineResult<Vec<FlatFeatureRow>>) -> ParsedLabels {
    match parse_labels(&row.payload) {
        Ok(parsed) => parsed,
        Err(source) => {
            tracing::warn!(app_key = %row.app_key, error = %source, "unparseable labeler response");
            result.add_error(PipelineError::LabelParse {
                app_key: row.app_key.to_string(),
                source,
            });
            ParsedLabels::empty()
        }
    }
}

/// One row per (app_key, normalized feature), first occurrence wins. An
/// app whose response yields no feature keeps a single placeholder row
/// with an empty feature and `neutral` support. Unparseable payloads are
/// recorded as non-fatal errors.
pub fn flatten_responses(rows: &[LlmResponseRow]) -> PipelineResult<Vec<FlatFeatureRow>> {
    let mut result = PipelineResult::default();
    let mut seen: FxHashSet<(AppKey, String)> = FxHashSet::default();
    let mut out = Vec::new();

    for row in rows {
        let parsed = parse_row(row, &mut result);
        let names = parsed.response.feature_names();
        let mut flat: Vec<FlatFeatureRow> = names
            .iter()
            .map(|name| FlatFeatureRow::from_row(row, name, parsed.support.support_for(name)))
            .collect();
        if flat.is_empty() {
            flat.push(FlatFeatureRow::from_row(row, "", DEFAULT_SUPPORT));
        }
        for f in flat {
            if seen.insert((f.app_key.clone(), f.feature_norm.clone())) {
                out.push(f);
            }
        }
    }

    tracing::info!(
        responses = rows.len(),
        rows = out.len(),
        errors = result.error_count(),
        "labeler responses flattened"
    );
    result.data = out;
    result
}

/// Explicit presence judgments as rater rows, rater = model name.
/// Responses without presence information contribute nothing.
pub fn rater_labels(rows: &[LlmResponseRow]) -> Vec<RaterLabel> {
    rows.iter()
        .filter_map(|row| parse_labels(&row.payload).ok().map(|p| (row, p)))
        .flat_map(|(row, parsed)| {
            parsed
                .response
                .presence()
                .into_iter()
                .map(move |p| RaterLabel {
                    app_key: row.app_key.clone(),
                    feature: normalize_feature(&p.feature),
                    rater: row.rater_name().to_string(),
                    present: p.present,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, payload: &str) -> LlmResponseRow {
        LlmResponseRow {
            app_key: AppKey::new(key),
            title: Some("App".into()),
            vendor: Some("openai".into()),
            model: Some("gpt-4o-mini".into()),
            payload: payload.into(),
            raw: None,
        }
    }

    #[test]
    fn test_flatten_dedups_and_defaults_support() {
        let rows = vec![row(
            "play:a",
            r#"{"features": ["Timer", "timer ", "Streaks"], "goldilocks_support": {"streaks": "undermining"}}"#,
        )];
        let result = flatten_responses(&rows);
        assert!(result.is_clean());
        let flat = result.data;
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].feature, "Timer");
        assert_eq!(flat[0].support, "neutral");
        assert_eq!(flat[1].feature_norm, "streaks");
        assert_eq!(flat[1].support, "undermining");
    }

    #[test]
    fn test_unparseable_keeps_placeholder() {
        let result = flatten_responses(&[row("play:a", "{oops"), row("play:b", "{\"summary\": \"x\"}")]);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.data.len(), 2);
        assert!(result.data.iter().all(|r| r.feature.is_empty() && r.support == "neutral"));
    }

    #[test]
    fn test_rater_labels_from_presence() {
        let rows = vec![
            row("play:a", r#"{"Blocking": {"present": true}, "timer": {"present": false}}"#),
            row("play:b", r#"["timer"]"#),
        ];
        let mut labels = rater_labels(&rows);
        labels.sort_by(|a, b| a.feature.cmp(&b.feature));
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].feature, "blocking");
        assert_eq!(labels[0].rater, "gpt-4o-mini");
        assert!(!labels[1].present);
    }
}
