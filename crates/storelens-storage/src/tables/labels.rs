//! Rater label tables and the agreement table.

use std::path::Path;

use storelens_analysis::agreement::{PairAgreement, RaterLabel};
use storelens_core::constants::HUMAN_RATER;
use storelens_core::errors::StorageError;
use storelens_core::types::AppKey;

use crate::table::{bit, fixed, Row, Table, TableWriter};

pub const AGREEMENT_COLUMNS: [&str; 7] = [
    "rater_a",
    "rater_b",
    "kappa",
    "n",
    "observed_agreement",
    "ci_low",
    "ci_high",
];

pub const RATER_COLUMNS: [&str; 4] = ["app_key", "feature", "rater", "present"];

const APP_KEY: &[&str] = &["app_key"];
const FEATURE: &[&str] = &["feature", "feature_norm"];
const RATER: &[&str] = &["rater", "model", "vendor"];
const PRESENT: &[&str] = &["present", "flag"];

/// `cols` holds app_key, feature and presence column indices.
fn label(row: &Row<'_>, cols: &[usize], rater: Option<String>) -> Option<RaterLabel> {
    Some(RaterLabel {
        app_key: AppKey::new(row.get(Some(cols[0]))?),
        feature: row.string(Some(cols[1]))?,
        rater: rater?,
        present: row.flag(Some(cols[2]))?,
    })
}

fn labels_from(
    table: &Table,
    cols: &[usize],
    rater: impl Fn(&Row<'_>) -> Option<String>,
) -> Vec<RaterLabel> {
    let mut skipped = 0usize;
    let mut out = Vec::with_capacity(table.len());
    for row in table.rows() {
        match label(&row, cols, rater(&row)) {
            Some(l) => out.push(l),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(path = table.path(), skipped, "incomplete rater rows skipped");
    }
    out
}

/// Long rater table. The rater may be named by `rater`, `model` or
/// `vendor`; presence by `present` or `flag`.
pub fn read_rater_labels(path: &Path) -> Result<Vec<RaterLabel>, StorageError> {
    let table = Table::read(path)?;
    let cols = table.require_columns(&[APP_KEY, FEATURE, PRESENT, RATER])?;
    let rater_col = cols[3];
    Ok(labels_from(&table, &cols, |row| row.string(Some(rater_col))))
}

/// Human labels `(app_key, feature, present)`, rated as `human`.
pub fn read_human_labels(path: &Path) -> Result<Vec<RaterLabel>, StorageError> {
    let table = Table::read(path)?;
    let cols = table.require_columns(&[APP_KEY, FEATURE, PRESENT])?;
    Ok(labels_from(&table, &cols, |_| Some(HUMAN_RATER.to_string())))
}

pub fn write_rater_labels(path: &Path, labels: &[RaterLabel]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, RATER_COLUMNS)?;
    for l in labels {
        w.write_row([
            l.app_key.as_str(),
            l.feature.as_str(),
            l.rater.as_str(),
            bit(l.present),
        ])?;
    }
    w.finish()
}

pub fn write_agreement(path: &Path, pairs: &[PairAgreement]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, AGREEMENT_COLUMNS)?;
    for p in pairs {
        w.write_row([
            p.rater_a.clone(),
            p.rater_b.clone(),
            fixed(p.kappa, 3),
            p.n.to_string(),
            fixed(p.observed_agreement, 3),
            fixed(p.ci_low, 3),
            fixed(p.ci_high, 3),
        ])?;
    }
    w.finish()
}
