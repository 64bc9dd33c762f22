//! Raw scrape dumps: JSON lines, a JSON array or object, or CSV.

use std::fs;
use std::path::Path;

use serde_json::Value;

use storelens_analysis::apps::RawRecord;
use storelens_core::errors::{PipelineResult, StorageError};

use crate::table::{require_input, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DumpFormat {
    JsonLines,
    Json,
    Csv,
}

impl DumpFormat {
    fn of(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::JsonLines,
        }
    }
}

/// Read every record of a raw dump. Malformed JSON lines, and array items
/// that are not objects, are skipped and reported as non-fatal errors.
pub fn read_raw_dump(path: &Path) -> Result<PipelineResult<Vec<RawRecord>>, StorageError> {
    require_input(path)?;
    let result = match DumpFormat::of(path) {
        DumpFormat::Csv => {
            let table = Table::read(path)?;
            PipelineResult::new(table.rows().map(|r| r.to_raw()).collect())
        }
        DumpFormat::Json => read_json(path)?,
        DumpFormat::JsonLines => read_json_lines(path)?,
    };
    if !result.is_clean() {
        tracing::warn!(
            path = %path.display(),
            skipped = result.error_count(),
            "malformed raw records skipped"
        );
    }
    tracing::info!(path = %path.display(), records = result.data.len(), "raw dump read");
    Ok(result)
}

fn read_text(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|e| StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn malformed(path: &Path, line: u64, message: impl Into<String>) -> StorageError {
    StorageError::MalformedRecord {
        path: path.display().to_string(),
        line,
        message: message.into(),
    }
}

fn read_json_lines(path: &Path) -> Result<PipelineResult<Vec<RawRecord>>, StorageError> {
    let text = read_text(path)?;
    let mut result: PipelineResult<Vec<RawRecord>> = PipelineResult::default();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lineno = i as u64 + 1;
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(obj)) => result.data.push(obj),
            Ok(_) => result.add_error(malformed(path, lineno, "not a JSON object").into()),
            Err(e) => result.add_error(malformed(path, lineno, e.to_string()).into()),
        }
    }
    Ok(result)
}

fn read_json(path: &Path) -> Result<PipelineResult<Vec<RawRecord>>, StorageError> {
    let text = read_text(path)?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| malformed(path, e.line() as u64, e.to_string()))?;
    let mut result: PipelineResult<Vec<RawRecord>> = PipelineResult::default();
    match value {
        Value::Object(obj) => result.data.push(obj),
        Value::Array(items) => {
            for (i, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(obj) => result.data.push(obj),
                    _ => result.add_error(
                        malformed(path, 0, format!("array item {i} is not an object")).into(),
                    ),
                }
            }
        }
        _ => return Err(malformed(path, 1, "expected a JSON array or object")),
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_by_extension() {
        assert_eq!(DumpFormat::of(Path::new("a.jsonl")), DumpFormat::JsonLines);
        assert_eq!(DumpFormat::of(Path::new("a.JSON")), DumpFormat::Json);
        assert_eq!(DumpFormat::of(Path::new("a.csv")), DumpFormat::Csv);
        assert_eq!(DumpFormat::of(Path::new("dump")), DumpFormat::JsonLines);
    }
}
