//! CSV tables read whole into memory, with columns resolved by alias.

use std::path::Path;
use std::str::FromStr;

use serde_json::Value;

use storelens_analysis::apps::RawRecord;
use storelens_core::errors::StorageError;

/// Fail with `MissingInput` unless `path` is an existing file.
pub fn require_input(path: &Path) -> Result<(), StorageError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StorageError::MissingInput {
            path: path.display().to_string(),
        })
    }
}

pub(crate) fn csv_error(path: &str, e: csv::Error) -> StorageError {
    StorageError::Csv {
        path: path.to_string(),
        message: e.to_string(),
    }
}

/// A fully-read CSV file.
#[derive(Debug, Clone)]
pub struct Table {
    path: String,
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl Table {
    /// Read a required table. Short rows are allowed; missing cells read
    /// as empty.
    pub fn read(path: &Path) -> Result<Self, StorageError> {
        require_input(path)?;
        let display = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| csv_error(&display, e))?;
        let headers = reader
            .headers()
            .map_err(|e| csv_error(&display, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| csv_error(&display, e))?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "table read");
        Ok(Self {
            path: display,
            headers,
            rows,
        })
    }

    /// Read an optional table; `None` when the file does not exist.
    pub fn read_optional(path: &Path) -> Result<Option<Self>, StorageError> {
        if !path.is_file() {
            tracing::info!(path = %path.display(), "optional input absent, skipping");
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first alias present in the header.
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|a| self.headers.iter().position(|h| h == a))
    }

    /// Index of the first header starting with `prefix`.
    pub fn column_with_prefix(&self, prefix: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.starts_with(prefix))
    }

    /// Resolve every alias group or fail naming the groups that are missing.
    /// Each group is reported by its first alias.
    pub fn require_columns(&self, groups: &[&[&str]]) -> Result<Vec<usize>, StorageError> {
        let mut found = Vec::with_capacity(groups.len());
        let mut missing = Vec::new();
        for aliases in groups {
            match self.column(aliases) {
                Some(i) => found.push(i),
                None => missing.push(aliases.first().copied().unwrap_or("?")),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(self.missing_columns(&missing))
        }
    }

    pub fn missing_columns(&self, columns: &[&str]) -> StorageError {
        StorageError::MissingColumns {
            path: self.path.clone(),
            columns: columns.join(", "),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |record| Row {
            record,
            headers: &self.headers,
        })
    }
}

/// One row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    record: &'a csv::StringRecord,
    headers: &'a [String],
}

impl<'a> Row<'a> {
    /// Trimmed cell; blank and absent cells are `None`.
    pub fn get(&self, col: Option<usize>) -> Option<&'a str> {
        self.record
            .get(col?)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn string(&self, col: Option<usize>) -> Option<String> {
        self.get(col).map(str::to_string)
    }

    pub fn parse<T: FromStr>(&self, col: Option<usize>) -> Option<T> {
        self.get(col)?.parse().ok()
    }

    /// Finite float.
    pub fn float(&self, col: Option<usize>) -> Option<f64> {
        self.parse::<f64>(col).filter(|x| x.is_finite())
    }

    /// Non-negative count; `"12.0"` reads as 12.
    pub fn count(&self, col: Option<usize>) -> Option<u64> {
        let cell = self.get(col)?;
        cell.parse::<u64>()
            .ok()
            .or_else(|| cell.parse::<f64>().ok().filter(|x| *x >= 0.0).map(|x| x as u64))
    }

    /// Boolean cell: true/false, yes/no, or a number where nonzero is true.
    pub fn flag(&self, col: Option<usize>) -> Option<bool> {
        parse_flag(self.get(col)?)
    }

    /// 1-based line in the source file, header included.
    pub fn line(&self) -> u64 {
        self.record.position().map(|p| p.line()).unwrap_or(0)
    }

    /// The row as a raw record keyed by header. Blank cells become `null`
    /// so alias resolution can skip them.
    pub fn to_raw(&self) -> RawRecord {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let v = match self.get(Some(i)) {
                    Some(s) => Value::String(s.to_string()),
                    None => Value::Null,
                };
                (h.clone(), v)
            })
            .collect()
    }
}

pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        other => other.parse::<f64>().ok().map(|x| x != 0.0),
    }
}
