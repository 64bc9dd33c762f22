//! Per-feature label files combined into one long table.

use serde::{Deserialize, Serialize};

use storelens_core::constants::{FEATURE_FILE_EXCLUDES, FEATURE_FILE_PREFIX};
use storelens_core::types::{AppKey, FxHashMap};

/// One row of a per-feature label file. Every value column is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFileRow {
    pub app_key: AppKey,
    /// Explicit flag column, when the file has one.
    pub flag: Option<bool>,
    pub confidence: Option<f64>,
    pub review_hits: Option<u64>,
}

/// The rows of `features_<name>.csv`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFile {
    pub feature: String,
    pub rows: Vec<FeatureFileRow>,
}

/// One (app, feature) cell of the long table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    pub app_key: AppKey,
    pub feature: String,
    pub flag: bool,
    pub confidence: f64,
    pub review_hits: u64,
}

/// `features_blocking.csv` -> `blocking`. Derived artifacts sharing the
/// prefix, and anything that is not a feature CSV, yield `None`.
pub fn feature_name_from_filename(file_name: &str) -> Option<String> {
    if FEATURE_FILE_EXCLUDES.contains(&file_name) {
        return None;
    }
    let name = file_name
        .strip_prefix(FEATURE_FILE_PREFIX)?
        .strip_suffix(".csv")?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Combine feature files into the long table.
///
/// Rows without an explicit flag are flagged when
/// `confidence >= min_confidence && review_hits >= min_review_hits`, with a
/// missing confidence read as 0.0 and missing hits as 0. A repeated
/// (app_key, feature) keeps its last row, in the position of the first.
pub fn assemble_long(files: &[FeatureFile], min_confidence: f64, min_review_hits: u64) -> Vec<LongRow> {
    let mut out: Vec<LongRow> = Vec::new();
    let mut index: FxHashMap<(AppKey, String), usize> = FxHashMap::default();
    for file in files {
        for row in &file.rows {
            if row.app_key.is_empty() {
                continue;
            }
            let confidence = row.confidence.unwrap_or(0.0);
            let review_hits = row.review_hits.unwrap_or(0);
            let flag = row
                .flag
                .unwrap_or(confidence >= min_confidence && review_hits >= min_review_hits);
            let long = LongRow {
                app_key: row.app_key.clone(),
                feature: file.feature.clone(),
                flag,
                confidence,
                review_hits,
            };
            let key = (long.app_key.clone(), long.feature.clone());
            match index.get(&key) {
                Some(&i) => out[i] = long,
                None => {
                    index.insert(key, out.len());
                    out.push(long);
                }
            }
        }
    }
    out
}
