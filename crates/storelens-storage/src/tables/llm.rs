//! Labeler response tables and their flattened form.

use std::path::Path;

use storelens_analysis::llm::{FlatFeatureRow, LlmResponseRow};
use storelens_core::errors::StorageError;
use storelens_core::types::{AppKey, FxHashSet};

use crate::table::{opt, Table, TableWriter};

pub const RESPONSE_COLUMNS: [&str; 6] = ["app_key", "title", "vendor", "model", "features_json", "raw"];

pub const FLAT_COLUMNS: [&str; 7] = [
    "app_key",
    "title",
    "vendor",
    "model",
    "feature",
    "feature_norm",
    "support",
];

/// Columns that may carry the response JSON, most specific first.
pub const PAYLOAD_COLUMNS: &[&str] = &[
    "features_json",
    "llm_json",
    "response_json",
    "json",
    "raw_json",
    "answer",
    "response",
    "model_output",
];

const APP_KEY: &[&str] = &["app_key"];
const TITLE: &[&str] = &["title"];
const VENDOR: &[&str] = &["vendor", "provider"];
const MODEL: &[&str] = &["model"];
const RAW: &[&str] = &["raw", "raw_response"];

/// Read a response table. One of [`PAYLOAD_COLUMNS`] is required; a
/// blank payload is kept so flattening can record it.
pub fn read_llm_responses(path: &Path) -> Result<Vec<LlmResponseRow>, StorageError> {
    let table = Table::read(path)?;
    let key_col = table.require_columns(&[APP_KEY])?[0];
    let payload_col = table
        .column(PAYLOAD_COLUMNS)
        .ok_or_else(|| table.missing_columns(&[PAYLOAD_COLUMNS.join("|").as_str()]))?;
    let title = table.column(TITLE);
    let vendor = table.column(VENDOR);
    let model = table.column(MODEL);
    let raw = table.column(RAW);

    let rows: Vec<LlmResponseRow> = table
        .rows()
        .filter_map(|row| {
            Some(LlmResponseRow {
                app_key: AppKey::new(row.get(Some(key_col))?),
                title: row.string(title),
                vendor: row.string(vendor),
                model: row.string(model),
                payload: row.string(Some(payload_col)).unwrap_or_default(),
                raw: row.string(raw),
            })
        })
        .collect();
    tracing::info!(path = table.path(), responses = rows.len(), "labeler responses read");
    Ok(rows)
}

fn response_cells(r: &LlmResponseRow) -> [String; 6] {
    [
        r.app_key.to_string(),
        opt(&r.title),
        opt(&r.vendor),
        opt(&r.model),
        r.payload.clone(),
        opt(&r.raw),
    ]
}

pub fn write_llm_responses(path: &Path, rows: &[LlmResponseRow]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, RESPONSE_COLUMNS)?;
    for r in rows {
        w.write_row(response_cells(r))?;
    }
    w.finish()
}

/// Append to an existing response table, for resumed runs.
pub fn append_llm_responses(path: &Path, rows: &[LlmResponseRow]) -> Result<usize, StorageError> {
    let mut w = TableWriter::append(path, RESPONSE_COLUMNS)?;
    for r in rows {
        w.write_row(response_cells(r))?;
    }
    w.finish()
}

/// App keys already present in a response table; empty when absent.
pub fn read_done_keys(path: &Path) -> Result<FxHashSet<AppKey>, StorageError> {
    let Some(table) = Table::read_optional(path)? else {
        return Ok(FxHashSet::default());
    };
    let Some(key_col) = table.column(APP_KEY) else {
        return Ok(FxHashSet::default());
    };
    Ok(table
        .rows()
        .filter_map(|r| r.get(Some(key_col)).map(AppKey::new))
        .collect())
}

pub fn write_flat_features(path: &Path, rows: &[FlatFeatureRow]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, FLAT_COLUMNS)?;
    for r in rows {
        w.write_row([
            r.app_key.to_string(),
            opt(&r.title),
            opt(&r.vendor),
            opt(&r.model),
            r.feature.clone(),
            r.feature_norm.clone(),
            r.support.clone(),
        ])?;
    }
    w.finish()
}
