//! Review table, plain and scored.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use storelens_analysis::sentiment::ScoredReview;
use storelens_core::errors::StorageError;
use storelens_core::types::{AppKey, ReviewRecord, SentimentLabel, Store};

use crate::table::{bit, opt, Row, Table, TableWriter};

pub const REVIEW_COLUMNS: [&str; 13] = [
    "app_key",
    "store",
    "app_id",
    "country",
    "lang",
    "review_id",
    "user_name",
    "rating",
    "title",
    "body",
    "version",
    "at",
    "special_reviews",
];

pub const SCORED_EXTRA_COLUMNS: [&str; 3] = ["sentiment_score", "sentiment_label", "text"];

/// Timestamps are written as UTC with a `Z` suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const APP_KEY: &[&str] = &["app_key"];
const STORE: &[&str] = &["store"];
const APP_ID: &[&str] = &["app_id", "appId"];
const COUNTRY: &[&str] = &["country"];
const LANG: &[&str] = &["lang", "language"];
const REVIEW_ID: &[&str] = &["review_id", "reviewId"];
const USER_NAME: &[&str] = &["user_name", "userName"];
const RATING: &[&str] = &["rating", "score"];
const TITLE: &[&str] = &["title"];
const BODY: &[&str] = &["body", "content", "text"];
const VERSION: &[&str] = &["version", "reviewCreatedVersion"];
const AT: &[&str] = &["at", "date", "updated"];
const SPECIAL: &[&str] = &["special_reviews", "special"];
const SENTIMENT_SCORE: &[&str] = &["sentiment_score"];
const SENTIMENT_LABEL: &[&str] = &["sentiment_label"];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// RFC 3339, a naive date-time read as UTC, or a bare date at midnight.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

struct Columns {
    app_key: Option<usize>,
    store: Option<usize>,
    app_id: Option<usize>,
    country: Option<usize>,
    lang: Option<usize>,
    review_id: Option<usize>,
    user_name: Option<usize>,
    rating: Option<usize>,
    title: Option<usize>,
    body: Option<usize>,
    version: Option<usize>,
    at: Option<usize>,
    special: Option<usize>,
    sentiment_score: Option<usize>,
    sentiment_label: Option<usize>,
}

impl Columns {
    fn resolve(table: &Table) -> Self {
        Self {
            app_key: table.column(APP_KEY),
            store: table.column(STORE),
            app_id: table.column(APP_ID),
            country: table.column(COUNTRY),
            lang: table.column(LANG),
            review_id: table.column(REVIEW_ID),
            user_name: table.column(USER_NAME),
            rating: table.column(RATING),
            title: table.column(TITLE),
            body: table.column(BODY),
            version: table.column(VERSION),
            at: table.column(AT),
            special: table.column(SPECIAL),
            sentiment_score: table.column(SENTIMENT_SCORE),
            sentiment_label: table.column(SENTIMENT_LABEL),
        }
    }

    fn review(&self, row: &Row<'_>) -> ReviewRecord {
        let store = row.string(self.store);
        let app_id = row.string(self.app_id);
        let app_key = match (row.get(self.app_key), store.as_deref(), app_id.as_deref()) {
            (Some(key), _, _) => AppKey::new(key),
            (None, Some(store), Some(id)) => AppKey::compute(&Store::parse(store), id),
            _ => AppKey::default(),
        };
        ReviewRecord {
            app_key,
            store,
            app_id,
            country: row.string(self.country),
            lang: row.string(self.lang),
            review_id: row.string(self.review_id),
            user_name: row.string(self.user_name),
            rating: row.float(self.rating),
            title: row.string(self.title),
            body: row.string(self.body),
            version: row.string(self.version),
            at: row.get(self.at).and_then(parse_timestamp),
            special: row.flag(self.special).unwrap_or(false),
            sentiment_score: row.float(self.sentiment_score),
            sentiment_label: row.get(self.sentiment_label).and_then(SentimentLabel::parse),
        }
    }
}

fn from_table(table: &Table) -> Vec<ReviewRecord> {
    let cols = Columns::resolve(table);
    let mut keyless = 0usize;
    let reviews: Vec<ReviewRecord> = table
        .rows()
        .map(|r| cols.review(&r))
        .filter(|r| {
            let keep = !r.app_key.is_empty();
            keyless += usize::from(!keep);
            keep
        })
        .collect();
    if keyless > 0 {
        tracing::warn!(path = table.path(), keyless, "review rows without app_key skipped");
    }
    reviews
}

/// Read a review table. Rows whose app cannot be identified are skipped.
pub fn read_reviews(path: &Path) -> Result<Vec<ReviewRecord>, StorageError> {
    Ok(from_table(&Table::read(path)?))
}

pub fn read_reviews_optional(path: &Path) -> Result<Option<Vec<ReviewRecord>>, StorageError> {
    Ok(Table::read_optional(path)?.map(|t| from_table(&t)))
}

fn review_cells(r: &ReviewRecord) -> Vec<String> {
    vec![
        r.app_key.to_string(),
        opt(&r.store),
        opt(&r.app_id),
        opt(&r.country),
        opt(&r.lang),
        opt(&r.review_id),
        opt(&r.user_name),
        opt(&r.rating),
        opt(&r.title),
        opt(&r.body),
        opt(&r.version),
        r.at.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
        bit(r.special).to_string(),
    ]
}

pub fn write_reviews(path: &Path, reviews: &[ReviewRecord]) -> Result<usize, StorageError> {
    let mut w = TableWriter::create(path, REVIEW_COLUMNS)?;
    for r in reviews {
        w.write_row(review_cells(r))?;
    }
    w.finish()
}

/// Review columns plus score, label and the scored text.
pub fn write_scored_reviews(path: &Path, scored: &[ScoredReview]) -> Result<usize, StorageError> {
    let header = REVIEW_COLUMNS.iter().chain(SCORED_EXTRA_COLUMNS.iter());
    let mut w = TableWriter::create(path, header)?;
    for s in scored {
        let mut cells = review_cells(&s.review);
        cells.push(opt(&s.review.sentiment_score));
        cells.push(
            s.review
                .sentiment_label
                .map(|l| l.name().to_string())
                .unwrap_or_default(),
        );
        cells.push(s.text.clone());
        w.write_row(cells)?;
    }
    w.finish()
}
