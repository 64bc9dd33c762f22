//! App, review, and website records in their canonical schema.
//!
//! Records are created once by normalization and never mutated in place;
//! later stages only derive new tables from them.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::identifiers::{AppKey, Store};

/// One application or extension, keyed by `app_key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppRecord {
    pub app_key: AppKey,
    pub store: Option<Store>,
    /// Platform id (package name, numeric id, extension id).
    pub id: Option<String>,
    /// Slug of the title plus store, kept for dashboard links.
    pub app_id: Option<String>,
    pub title: Option<String>,
    pub developer: Option<String>,
    pub category: Option<String>,
    pub installs_or_users: Option<u64>,
    pub rating_avg: Option<f64>,
    pub rating_count: Option<u64>,
    pub iap_min: Option<f64>,
    pub iap_max: Option<f64>,
    pub pricing_raw: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub store_url: Option<String>,
    pub icon_url: Option<String>,
    pub version: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub last_update: Option<NaiveDate>,
    pub relevance_score: Option<f64>,
    pub scraped_at: Option<NaiveDate>,
}

impl AppRecord {
    pub fn new(app_key: impl Into<AppKey>) -> Self {
        Self {
            app_key: app_key.into(),
            ..Default::default()
        }
    }

    /// Category and developer joined with a space, the "metadata" source text.
    pub fn metadata_text(&self) -> String {
        format!(
            "{} {}",
            self.category.as_deref().unwrap_or(""),
            self.developer.as_deref().unwrap_or("")
        )
    }
}

/// Scraped website text for one app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteText {
    pub app_key: AppKey,
    pub website_text: String,
}

/// Polarity label assigned by a sentiment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" => Some(Self::Positive),
            "neutral" | "neu" => Some(Self::Neutral),
            "negative" | "neg" => Some(Self::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One user review belonging to exactly one app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub app_key: AppKey,
    pub store: Option<String>,
    pub app_id: Option<String>,
    pub country: Option<String>,
    pub lang: Option<String>,
    pub review_id: Option<String>,
    pub user_name: Option<String>,
    /// Star rating 1-5, absent when the store did not report one.
    pub rating: Option<f64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub version: Option<String>,
    pub at: Option<DateTime<Utc>>,
    /// Neurodivergence-related content, set by the special-review detector.
    pub special: bool,
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<SentimentLabel>,
}

impl ReviewRecord {
    pub fn new(app_key: impl Into<AppKey>) -> Self {
        Self {
            app_key: app_key.into(),
            ..Default::default()
        }
    }

    /// Body and title joined for pattern matching, lowercased.
    /// Missing parts contribute nothing.
    pub fn match_text(&self) -> String {
        let body = self.body.as_deref().unwrap_or("");
        let title = self.title.as_deref().unwrap_or("");
        format!("{body} {title}").trim().to_lowercase()
    }

    pub fn body_len(&self) -> usize {
        self.body.as_deref().map(str::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_text_handles_missing_parts() {
        let mut r = ReviewRecord::new("play:x");
        assert_eq!(r.match_text(), "");
        r.body = Some("Great BLOCKER".to_string());
        assert_eq!(r.match_text(), "great blocker");
        r.title = Some("Wow".to_string());
        assert_eq!(r.match_text(), "great blocker wow");
    }

    #[test]
    fn test_metadata_text() {
        let mut app = AppRecord::new("play:x");
        app.category = Some("PRODUCTIVITY".to_string());
        app.developer = Some("Focus Labs".to_string());
        assert_eq!(app.metadata_text(), "PRODUCTIVITY Focus Labs");
    }

    #[test]
    fn test_sentiment_label_parse() {
        assert_eq!(SentimentLabel::parse("Positive"), Some(SentimentLabel::Positive));
        assert_eq!(SentimentLabel::parse("neg"), Some(SentimentLabel::Negative));
        assert_eq!(SentimentLabel::parse("meh"), None);
    }
}
