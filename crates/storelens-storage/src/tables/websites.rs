//! Scraped website text keyed by app.

use std::path::Path;

use storelens_core::errors::StorageError;
use storelens_core::types::{AppKey, FxHashMap};

use crate::table::Table;

const TEXT_COLUMN: &str = "website_text";

/// `app_key` plus `website_text` (or the first column whose name starts
/// with it). Blank texts are skipped; a repeated key keeps the last text.
pub fn read_websites(path: &Path) -> Result<FxHashMap<AppKey, String>, StorageError> {
    from_table(&Table::read(path)?)
}

pub fn read_websites_optional(
    path: &Path,
) -> Result<Option<FxHashMap<AppKey, String>>, StorageError> {
    Table::read_optional(path)?.map(|t| from_table(&t)).transpose()
}

fn from_table(table: &Table) -> Result<FxHashMap<AppKey, String>, StorageError> {
    let key_col = table.column(&["app_key"]);
    let text_col = table
        .column(&[TEXT_COLUMN])
        .or_else(|| table.column_with_prefix(TEXT_COLUMN));
    let (Some(key_col), Some(text_col)) = (key_col, text_col) else {
        let mut missing = Vec::new();
        if key_col.is_none() {
            missing.push("app_key");
        }
        if text_col.is_none() {
            missing.push(TEXT_COLUMN);
        }
        return Err(table.missing_columns(&missing));
    };

    let mut out = FxHashMap::default();
    for row in table.rows() {
        if let (Some(key), Some(text)) = (row.get(Some(key_col)), row.get(Some(text_col))) {
            out.insert(AppKey::new(key), text.to_string());
        }
    }
    tracing::info!(path = table.path(), sites = out.len(), "website texts loaded");
    Ok(out)
}
