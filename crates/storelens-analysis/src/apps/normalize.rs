//! Raw scrape records -> canonical App table.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use storelens_core::types::{AppKey, AppRecord, Store};

use super::fields::{self as f, RawRecord};
use super::relevance::RelevanceScorer;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

const DEFAULT_STORE: &str = "PlayStore";

/// Lowercase, non-alphanumeric runs to `-`, trimmed.
pub fn slugify(s: &str) -> String {
    SLUG_RE
        .replace_all(&s.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Canonical fields of one record, without derived columns. A missing
/// `app_key` is computed when the record names its store and id.
pub fn resolve_record(raw: &RawRecord) -> AppRecord {
    let store = f::text(f::first_existing(raw, f::STORE)).map(|s| Store::parse(&s));
    let id = f::text(f::first_existing(raw, f::ID));
    let app_key = f::text(f::first_existing(raw, f::APP_KEY))
        .map(AppKey::new)
        .or_else(|| match (&store, id.as_deref()) {
            (Some(store), Some(id)) => Some(AppKey::compute(store, id)),
            _ => None,
        })
        .unwrap_or_default();

    let pricing_raw = f::text(f::first_existing(raw, f::PRICING_RAW));
    let mut iap_min = f::float(f::first_existing(raw, f::IAP_MIN));
    let mut iap_max = f::float(f::first_existing(raw, f::IAP_MAX));
    if iap_min.is_none() && iap_max.is_none() {
        if let Some((lo, hi)) = pricing_raw.as_deref().and_then(f::parse_price_range) {
            iap_min = Some(lo);
            iap_max = Some(hi);
        }
    }

    AppRecord {
        app_key,
        store,
        id,
        app_id: f::text(f::first_existing(raw, f::APP_ID)),
        title: f::text(f::first_existing(raw, f::TITLE)),
        developer: f::text(f::first_existing(raw, f::DEVELOPER)),
        category: f::text(f::first_existing(raw, f::CATEGORY)),
        installs_or_users: f::count(f::first_existing(raw, f::INSTALLS)),
        rating_avg: f::float(f::first_existing(raw, f::RATING_AVG)),
        rating_count: f::count(f::first_existing(raw, f::RATING_COUNT)),
        iap_min,
        iap_max,
        pricing_raw,
        description: f::text(f::first_nonempty(raw, f::DESCRIPTION)),
        website_url: f::text(f::first_nonempty(raw, f::WEBSITE_URL)),
        store_url: f::text(f::first_existing(raw, f::STORE_URL)),
        icon_url: f::text(f::first_existing(raw, f::ICON_URL)),
        version: f::text(f::first_existing(raw, f::VERSION)),
        release_date: f::to_iso_date(f::first_existing(raw, f::RELEASE_DATE)),
        last_update: f::to_iso_date(f::first_existing(raw, f::LAST_UPDATE)),
        relevance_score: f::float(f::first_existing(raw, f::RELEVANCE)),
        scraped_at: f::to_iso_date(f::first_existing(raw, f::SCRAPED_AT)),
    }
}

/// Resolve one raw scrape record and derive `app_id` and
/// `relevance_score`. Never fails; unresolvable fields stay empty.
pub fn normalize_record(raw: &RawRecord, scorer: &RelevanceScorer, today: NaiveDate) -> AppRecord {
    let mut app = resolve_record(raw);
    let store = app
        .store
        .get_or_insert_with(|| Store::parse(DEFAULT_STORE))
        .clone();
    if app.app_key.is_empty() {
        if let Some(id) = app.id.as_deref() {
            app.app_key = AppKey::compute(&store, id);
        }
    }
    app.app_id = Some(format!(
        "{}_{}",
        slugify(app.title.as_deref().unwrap_or("")),
        store.name().to_lowercase().replace(' ', "")
    ));
    app.relevance_score = Some(scorer.score(&app, today));
    app
}

pub fn normalize_records(raws: &[RawRecord], scorer: &RelevanceScorer, today: NaiveDate) -> Vec<AppRecord> {
    let apps: Vec<AppRecord> = raws
        .iter()
        .map(|r| normalize_record(r, scorer, today))
        .collect();
    let keyless = apps.iter().filter(|a| a.app_key.is_empty()).count();
    if keyless > 0 {
        tracing::warn!(keyless, "records without app_key or platform id");
    }
    tracing::info!(apps = apps.len(), "apps normalized");
    apps
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_normalize_play_record() {
        let raw = json!({
            "store": "googleplay",
            "package": "com.focus.app",
            "name": "Focus: Timer!",
            "genre": "PRODUCTIVITY",
            "installs": "50,000+",
            "ratingCount": 1200,
            "score": "4.5",
            "description": "",
            "description_full": "Block apps",
            "pricing_raw": "$0.99 - $21.99 per item",
            "updated": "Dec 1, 2024"
        });
        let scorer = RelevanceScorer::builtin().unwrap();
        let app = normalize_record(raw.as_object().unwrap(), &scorer, today());
        assert_eq!(app.app_key.as_str(), "play:com.focus.app");
        assert_eq!(app.store, Some(Store::PlayStore));
        assert_eq!(app.app_id.as_deref(), Some("focus-timer_playstore"));
        assert_eq!(app.installs_or_users, Some(50_000));
        assert_eq!(app.rating_count, Some(1200));
        assert_eq!(app.rating_avg, Some(4.5));
        assert_eq!(app.description.as_deref(), Some("Block apps"));
        assert_eq!((app.iap_min, app.iap_max), (Some(0.99), Some(21.99)));
        assert_eq!(app.last_update, NaiveDate::from_ymd_opt(2024, 12, 1));
        let rel = app.relevance_score.unwrap();
        assert!(rel > 0.0 && rel <= 1.0);
    }

    #[test]
    fn test_existing_app_key_and_default_store() {
        let raw = json!({"app_key": "cws:abc", "title": "X"});
        let scorer = RelevanceScorer::builtin().unwrap();
        let app = normalize_record(raw.as_object().unwrap(), &scorer, today());
        assert_eq!(app.app_key.as_str(), "cws:abc");
        assert_eq!(app.store, Some(Store::PlayStore));
    }

    #[test]
    fn test_resolve_keeps_table_columns() {
        let raw = json!({"app_key": "play:x", "app_id": "x_playstore", "relevance_score": "0.42"});
        let app = resolve_record(raw.as_object().unwrap());
        assert_eq!(app.store, None);
        assert_eq!(app.app_id.as_deref(), Some("x_playstore"));
        assert_eq!(app.relevance_score, Some(0.42));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hello, World!! 2 "), "hello-world-2");
    }
}
