//! CSV writer with a fixed header.

use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

use storelens_core::errors::StorageError;

use super::reader::csv_error;

fn io_error(path: &str, e: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_string(),
        message: e.to_string(),
    }
}

fn ensure_parent(path: &Path, display: &str) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| io_error(display, e))
        }
        _ => Ok(()),
    }
}

/// Writes one table. Parent directories are created on open.
pub struct TableWriter {
    path: String,
    inner: csv::Writer<File>,
    rows: usize,
}

impl TableWriter {
    /// Create or truncate `path` and write the header.
    pub fn create<I, S>(path: &Path, header: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let display = path.display().to_string();
        ensure_parent(path, &display)?;
        let mut inner = csv::Writer::from_path(path).map_err(|e| csv_error(&display, e))?;
        inner
            .write_record(header)
            .map_err(|e| csv_error(&display, e))?;
        Ok(Self {
            path: display,
            inner,
            rows: 0,
        })
    }

    /// Append to `path`. The header is written only when the file is new
    /// or empty.
    pub fn append<I, S>(path: &Path, header: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let display = path.display().to_string();
        ensure_parent(path, &display)?;
        let has_content = fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_error(&display, e))?;
        let mut inner = csv::WriterBuilder::new().from_writer(file);
        if !has_content {
            inner
                .write_record(header)
                .map_err(|e| csv_error(&display, e))?;
        }
        Ok(Self {
            path: display,
            inner,
            rows: 0,
        })
    }

    pub fn write_row<I, S>(&mut self, row: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.inner
            .write_record(row)
            .map_err(|e| csv_error(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of data rows written.
    pub fn finish(mut self) -> Result<usize, StorageError> {
        self.inner
            .flush()
            .map_err(|e| io_error(&self.path, e))?;
        tracing::debug!(path = %self.path, rows = self.rows, "table written");
        Ok(self.rows)
    }
}

/// Empty cell for `None`.
pub fn opt<T: Display>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Fixed decimals.
pub fn fixed(v: f64, decimals: usize) -> String {
    format!("{v:.decimals$}")
}

pub fn opt_fixed(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| fixed(x, decimals)).unwrap_or_default()
}

pub fn bit(v: bool) -> &'static str {
    if v {
        "1"
    } else {
        "0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(opt(&Some(3u64)), "3");
        assert_eq!(opt::<u64>(&None), "");
        assert_eq!(fixed(0.8, 2), "0.80");
        assert_eq!(opt_fixed(Some(0.12345), 3), "0.123");
        assert_eq!(opt_fixed(None, 3), "");
        assert_eq!(bit(true), "1");
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut w = TableWriter::append(&path, ["a", "b"]).unwrap();
        w.write_row(["1", "2"]).unwrap();
        assert_eq!(w.finish().unwrap(), 1);
        let mut w = TableWriter::append(&path, ["a", "b"]).unwrap();
        w.write_row(["3", "4"]).unwrap();
        w.finish().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a,b\n1,2\n3,4\n");
    }
}
