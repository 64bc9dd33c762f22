//! Feature label files, matrices, the long table and the bundle.

use std::fs;
use std::path::{Path, PathBuf};

use storelens_analysis::flags::FlagRun;
use storelens_analysis::matrix::{
    feature_name_from_filename, Bundle, FeatureFile, FeatureFileRow, FeatureMatrix, LongRow,
    MatrixSet,
};
use storelens_analysis::reviews::FeatureReviewStat;
use storelens_core::constants::{
    FEATURES_LONG_FILE, FEATURE_FILE_PREFIX, MATRIX_CONFIDENCE_FILE, MATRIX_FLAGS_FILE,
    MATRIX_REVIEW_HITS_FILE,
};
use storelens_core::errors::StorageError;
use storelens_core::types::{AppKey, Store};

use crate::table::{bit, fixed, opt, opt_fixed, Table, TableWriter};

pub const LABEL_COLUMNS: [&str; 5] = ["app_key", "title", "confidence", "signals", "review_hits"];
pub const LONG_COLUMNS: [&str; 5] = ["app_key", "feature", "flag", "confidence", "review_hits"];
pub const BUNDLE_APP_COLUMNS: [&str; 6] = [
    "store",
    "title",
    "rating_avg",
    "rating_count",
    "installs_or_users",
    "relevance_score",
];
pub const BUNDLE_SENTIMENT_COLUMNS: [&str; 6] = [
    "avg_rating",
    "mean_compound",
    "pct_positive",
    "pct_negative",
    "n_reviews",
    "n_nd",
];
pub const REVIEW_STATS_COLUMNS: [&str; 5] =
    ["app_key", "feature", "review_hits", "avg_rating", "mean_compound"];

const APP_KEY: &[&str] = &["app_key"];
const FEATURE: &[&str] = &["feature"];
const FLAG: &[&str] = &["flag", "present"];
const CONFIDENCE: &[&str] = &["confidence"];
const REVIEW_HITS: &[&str] = &["review_hits"];
const PLATFORM_ID: &[&str] = &["id", "app_id"];

/// `features_<name>.csv` path for one feature.
pub fn feature_file_path(dir: &Path, feature: &str) -> PathBuf {
    dir.join(format!("{FEATURE_FILE_PREFIX}{feature}.csv"))
}

/// Label files in `dir`, sorted by file name. Derived artifacts sharing
/// the prefix are excluded. Finding none is a missing-input error.
pub fn discover_feature_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, StorageError> {
    let pattern = dir.join(format!("{FEATURE_FILE_PREFIX}*.csv"));
    let missing = || StorageError::MissingInput {
        path: pattern.display().to_string(),
    };
    let entries = fs::read_dir(dir).map_err(|_| missing())?;
    let mut named: Vec<(String, String, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            let feature = feature_name_from_filename(&name)?;
            Some((name, feature, e.path()))
        })
        .collect();
    named.sort_by(|a, b| a.0.cmp(&b.0));
    let found: Vec<(String, PathBuf)> = named.into_iter().map(|(_, f, p)| (f, p)).collect();
    if found.is_empty() {
        return Err(missing());
    }
    tracing::info!(dir = %dir.display(), files = found.len(), "feature files discovered");
    Ok(found)
}

/// Read one label file. The key is `app_key`, else computed from
/// `store` and `id`; rows with neither are skipped.
pub fn read_feature_file(path: &Path, feature: &str) -> Result<FeatureFile, StorageError> {
    let table = Table::read(path)?;
    let key_col = table.column(APP_KEY);
    let store_col = table.column(&["store"]);
    let id_col = table.column(PLATFORM_ID);
    let flag_col = table.column(FLAG);
    let conf_col = table.column(CONFIDENCE);
    let hits_col = table.column(REVIEW_HITS);

    let mut skipped = 0usize;
    let mut rows = Vec::with_capacity(table.len());
    for row in table.rows() {
        let app_key = match (row.get(key_col), row.get(store_col), row.get(id_col)) {
            (Some(key), _, _) => AppKey::new(key),
            (None, Some(store), Some(id)) => AppKey::compute(&Store::parse(store), id),
            _ => {
                skipped += 1;
                continue;
            }
        };
        rows.push(FeatureFileRow {
            app_key,
            flag: row.flag(flag_col),
            confidence: row.float(conf_col),
            review_hits: row.count(hits_col),
        });
    }
    if skipped > 0 {
        tracing::warn!(path = table.path(), skipped, "feature rows without app key skipped");
    }
    Ok(FeatureFile {
        feature: feature.to_string(),
        rows,
    })
}

/// Flagged rows of one feature run.
pub fn write_feature_labels(path: &Path, run: &FlagRun) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, LABEL_COLUMNS)?;
    for l in &run.labels {
        w.write_row([
            l.app_key.to_string(),
            l.title.clone(),
            fixed(l.rounded_confidence(), 2),
            l.signals(),
            l.review_hits.to_string(),
        ])?;
    }
    w.finish()
}

fn write_matrix<T: Copy>(
    path: &Path,
    matrix: &FeatureMatrix<T>,
    cell: impl Fn(T) -> String,
) -> Result<usize, StorageError> {
    let header = std::iter::once("app_key").chain(matrix.features().iter().map(String::as_str));
    let mut w = TableWriter::create(path, header)?;
    for (key, cells) in matrix.rows() {
        let row = std::iter::once(key.to_string()).chain(cells.iter().map(|c| cell(*c)));
        w.write_row(row)?;
    }
    w.finish()
}

/// The three matrices, indexed by `app_key`. Returns the written paths
/// in flags, confidence, review-hits order.
pub fn write_matrices(dir: &Path, set: &MatrixSet) -> Result<[PathBuf; 3], StorageError> {
    let paths = [
        dir.join(MATRIX_FLAGS_FILE),
        dir.join(MATRIX_CONFIDENCE_FILE),
        dir.join(MATRIX_REVIEW_HITS_FILE),
    ];
    write_matrix(&paths[0], &set.flags, |v| v.to_string())?;
    write_matrix(&paths[1], &set.confidence, |v| v.to_string())?;
    write_matrix(&paths[2], &set.review_hits, |v| v.to_string())?;
    Ok(paths)
}

pub fn long_path(dir: &Path) -> PathBuf {
    dir.join(FEATURES_LONG_FILE)
}

pub fn write_long(path: &Path, long: &[LongRow]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, LONG_COLUMNS)?;
    for r in long {
        w.write_row(long_cells(r))?;
    }
    w.finish()
}

fn long_cells(r: &LongRow) -> Vec<String> {
    vec![
        r.app_key.to_string(),
        r.feature.clone(),
        bit(r.flag).to_string(),
        r.confidence.to_string(),
        r.review_hits.to_string(),
    ]
}

/// A long table as written by [`write_long`].
pub fn read_long(path: &Path) -> Result<Vec<LongRow>, StorageError> {
    let table = Table::read(path)?;
    let cols = table.require_columns(&[APP_KEY, FEATURE, FLAG])?;
    let conf_col = table.column(CONFIDENCE);
    let hits_col = table.column(REVIEW_HITS);
    Ok(table
        .rows()
        .filter_map(|row| {
            Some(LongRow {
                app_key: AppKey::new(row.get(Some(cols[0]))?),
                feature: row.string(Some(cols[1]))?,
                flag: row.flag(Some(cols[2])).unwrap_or(false),
                confidence: row.float(conf_col).unwrap_or(0.0),
                review_hits: row.count(hits_col).unwrap_or(0),
            })
        })
        .collect())
}

/// Long columns, then the app group and the sentiment group when the
/// bundle carries them.
pub fn write_bundle(path: &Path, bundle: &Bundle) -> Result<usize, StorageError> {
    let mut header: Vec<&str> = LONG_COLUMNS.to_vec();
    if bundle.has_apps {
        header.extend(BUNDLE_APP_COLUMNS);
    }
    if bundle.has_sentiment {
        header.extend(BUNDLE_SENTIMENT_COLUMNS);
    }
    let mut w = TableWriter::create(path, &header)?;
    for row in &bundle.rows {
        let mut cells = long_cells(&row.long);
        if bundle.has_apps {
            match &row.app {
                Some(a) => cells.extend([
                    opt(&a.store),
                    opt(&a.title),
                    opt(&a.rating_avg),
                    opt(&a.rating_count),
                    opt(&a.installs_or_users),
                    opt(&a.relevance_score),
                ]),
                None => cells.extend(BUNDLE_APP_COLUMNS.map(|_| String::new())),
            }
        }
        if bundle.has_sentiment {
            match &row.sentiment {
                Some(s) => cells.extend([
                    opt(&s.avg_rating),
                    opt(&s.mean_compound),
                    opt(&s.pct_positive),
                    opt(&s.pct_negative),
                    s.n_reviews.to_string(),
                    s.n_nd.to_string(),
                ]),
                None => cells.extend(BUNDLE_SENTIMENT_COLUMNS.map(|_| String::new())),
            }
        }
        w.write_row(cells)?;
    }
    w.finish()
}

pub fn write_review_stats(path: &Path, stats: &[FeatureReviewStat]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, REVIEW_STATS_COLUMNS)?;
    for s in stats {
        w.write_row([
            s.app_key.to_string(),
            s.feature.clone(),
            s.review_hits.to_string(),
            opt_fixed(s.avg_rating, 3),
            opt_fixed(s.mean_compound, 3),
        ])?;
    }
    w.finish()
}
