//! Sentiment aggregate table.

use std::path::Path;

use storelens_analysis::sentiment::SentimentAggregate;
use storelens_core::errors::StorageError;
use storelens_core::types::AppKey;

use crate::table::{opt, Table, TableWriter};

pub const SENTIMENT_COLUMNS: [&str; 9] = [
    "app_key",
    "store",
    "country",
    "n_reviews",
    "n_nd",
    "avg_rating",
    "mean_compound",
    "pct_positive",
    "pct_negative",
];

const APP_KEY: &[&str] = &["app_key"];
const STORE: &[&str] = &["store"];
const COUNTRY: &[&str] = &["country"];
const N_REVIEWS: &[&str] = &["n_reviews", "review_count", "n"];
const N_ND: &[&str] = &["n_nd", "n_special"];
const AVG_RATING: &[&str] = &["avg_rating", "rating_mean", "mean_rating"];
const MEAN_COMPOUND: &[&str] = &["mean_compound", "sentiment_mean", "compound_mean"];
const PCT_POSITIVE: &[&str] = &["pct_positive", "share_positive"];
const PCT_NEGATIVE: &[&str] = &["pct_negative", "share_negative"];

pub fn write_sentiment(path: &Path, rows: &[SentimentAggregate]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, SENTIMENT_COLUMNS)?;
    for r in rows {
        w.write_row([
            r.app_key.to_string(),
            opt(&r.store),
            opt(&r.country),
            r.n_reviews.to_string(),
            r.n_nd.to_string(),
            opt(&r.avg_rating),
            opt(&r.mean_compound),
            opt(&r.pct_positive),
            opt(&r.pct_negative),
        ])?;
    }
    w.finish()
}

fn from_table(table: &Table) -> Result<Vec<SentimentAggregate>, StorageError> {
    if table.headers().is_empty() {
        return Ok(Vec::new());
    }
    let key = table.require_columns(&[APP_KEY])?[0];
    let store = table.column(STORE);
    let country = table.column(COUNTRY);
    let n_reviews = table.column(N_REVIEWS);
    let n_nd = table.column(N_ND);
    let avg_rating = table.column(AVG_RATING);
    let mean_compound = table.column(MEAN_COMPOUND);
    let pct_positive = table.column(PCT_POSITIVE);
    let pct_negative = table.column(PCT_NEGATIVE);

    Ok(table
        .rows()
        .filter_map(|row| {
            Some(SentimentAggregate {
                app_key: AppKey::new(row.get(Some(key))?),
                store: row.string(store),
                country: row.string(country),
                n_reviews: row.count(n_reviews).unwrap_or(0),
                n_nd: row.count(n_nd).unwrap_or(0),
                avg_rating: row.float(avg_rating),
                mean_compound: row.float(mean_compound),
                pct_positive: row.float(pct_positive),
                pct_negative: row.float(pct_negative),
            })
        })
        .collect())
}

/// Read an aggregate table. Metric columns are optional; a missing
/// `n_reviews` reads as zero weight.
pub fn read_sentiment(path: &Path) -> Result<Vec<SentimentAggregate>, StorageError> {
    from_table(&Table::read(path)?)
}

/// `None` when the file is absent. A present but empty file is
/// `Some(vec![])`.
pub fn read_sentiment_optional(path: &Path) -> Result<Option<Vec<SentimentAggregate>>, StorageError> {
    Table::read_optional(path)?.map(|t| from_table(&t)).transpose()
}
