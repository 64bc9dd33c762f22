//! Canonical field resolution over raw scrape records.
//!
//! Each canonical field has an ordered alias list. "Existing" resolution
//! takes the first alias key present in the record; "non-empty" resolution
//! skips aliases whose value is null or blank.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{Map, Value};

/// One raw record: a JSON object from a dump line or a CSV row.
pub type RawRecord = Map<String, Value>;

pub const STORE: &[&str] = &["store"];
pub const APP_KEY: &[&str] = &["app_key"];
pub const ID: &[&str] = &["id", "app_id", "package"];
pub const APP_ID: &[&str] = &["app_id"];
pub const TITLE: &[&str] = &["title", "name"];
pub const DEVELOPER: &[&str] = &["developer", "offered_by", "seller"];
pub const CATEGORY: &[&str] = &["genre", "category"];
pub const RATING_AVG: &[&str] = &["rating_avg", "ratingValue", "score"];
pub const RATING_COUNT: &[&str] = &["rating_count", "ratingCount", "ratings"];
pub const DESCRIPTION: &[&str] = &["description", "description_full", "summary"];
pub const WEBSITE_URL: &[&str] = &["website_url", "website", "url"];
pub const STORE_URL: &[&str] = &["store_url"];
pub const ICON_URL: &[&str] = &["icon_url"];
pub const VERSION: &[&str] = &["version"];
pub const PRICING_RAW: &[&str] = &["pricing_raw"];
pub const IAP_MIN: &[&str] = &["iap_min"];
pub const IAP_MAX: &[&str] = &["iap_max"];
pub const INSTALLS: &[&str] = &["installs_or_users", "installs", "users"];
pub const RELEASE_DATE: &[&str] = &["release_date", "released", "releaseDate"];
pub const LAST_UPDATE: &[&str] = &["last_update", "updated", "lastUpdated"];
pub const SCRAPED_AT: &[&str] = &["scraped_at", "scrapedAt"];
pub const RELEVANCE: &[&str] = &["relevance_score"];

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$£€]\s?(\d+(?:\.\d{1,2})?)").unwrap());

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d\s]*").unwrap());

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Value of the first alias key present in the record.
pub fn first_existing<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|a| record.get(*a))
}

/// Value of the first alias whose value is neither null nor blank.
pub fn first_nonempty<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|a| record.get(*a))
        .find(|v| !is_blank(v))
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Scalar as trimmed text; null and blank are `None`.
pub fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn float(v: Option<&Value>) -> Option<f64> {
    let x = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    };
    x.filter(|x: &f64| x.is_finite())
}

/// Counts that may arrive as numbers or human strings.
pub fn count(v: Option<&Value>) -> Option<u64> {
    match v? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|x| *x >= 0.0).map(|x| x as u64)),
        Value::String(s) => parse_int_from_human(s),
        _ => None,
    }
}

/// `"50,000+"` -> 50000, `"700,000 users"` -> 700000.
pub fn parse_int_from_human(s: &str) -> Option<u64> {
    let cleaned = s
        .to_lowercase()
        .replace("users", "")
        .replace('+', "")
        .replace(',', " ");
    let m = DIGITS_RE.find(cleaned.trim())?;
    let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Min and max currency amounts in e.g. `"$0.99 - $21.99 per item"`.
pub fn parse_price_range(s: &str) -> Option<(f64, f64)> {
    let values: Vec<f64> = PRICE_RE
        .captures_iter(s)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect();
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some((min, max))
}

/// Parse a date from common scrape formats. Numbers are Unix timestamps
/// (milliseconds when large).
pub fn to_iso_date(v: Option<&Value>) -> Option<NaiveDate> {
    match v? {
        Value::Number(n) => {
            let x = n.as_f64()?;
            let secs = if x.abs() > 1e11 { x / 1000.0 } else { x };
            DateTime::from_timestamp(secs as i64, 0).map(|dt| dt.date_naive())
        }
        Value::String(s) => parse_date_str(s),
        _ => None,
    }
}

pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for f in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}
