//! Relevance score in [0, 1] for the focus/productivity niche.
//!
//! Field-weighted whole-word term counts with phrase bonuses, compressed
//! to [0, 1], plus a per-store category bonus, logarithmic popularity
//! bonuses, and a recency bonus or penalty.

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

use storelens_core::errors::PatternError;
use storelens_core::types::{AppRecord, Store};

const INCLUDE_TERMS: &[&str] = &[
    "focus", "focused", "productivity", "productive", "pomodoro", "timer", "countdown", "study",
    "study timer", "deep work", "habit", "routine", "adhd", "mindful", "meditation", "block",
    "blocker", "website blocker", "site blocker", "distraction", "parental", "screen time",
];

const INCLUDE_PHRASES: &[&str] = &[
    "site blocker", "website blocker", "parental control", "screen time", "focus timer",
    "study timer", "deep work",
];

const EXCLUDE_TERMS: &[&str] = &[
    "wallpaper", "theme", "ringtone", "launcher", "keyboard", "icon", "vpn", "antivirus",
    "camera", "photo", "video", "music", "game", "gallery", "widget",
];

const JUNK_CATEGORY_MARKERS: &[&str] = &["wallpaper", "ringtones", "themes", "games"];

/// (field weight, include multiplier, exclude multiplier)
const TITLE_WEIGHTS: (f64, f64, f64) = (3.0, 1.0, 2.0);
const CATEGORY_WEIGHTS: (f64, f64, f64) = (2.0, 0.8, 1.5);
const DESCRIPTION_WEIGHTS: (f64, f64, f64) = (1.0, 0.6, 0.5);
const DEVELOPER_WEIGHTS: (f64, f64, f64) = (0.5, 0.4, 0.5);

const PHRASE_BONUS: f64 = 2.0;
const TEXT_SCALE: f64 = 7.0;
const CATEGORY_BONUS: f64 = 0.12;
const JUNK_CATEGORY_PENALTY: f64 = 0.08;
const RATINGS_MAX_BONUS: f64 = 0.18;
const INSTALLS_MAX_BONUS: f64 = 0.18;
const FRESH_DAYS: i64 = 365;
const STALE_DAYS: i64 = 365 * 3;
const FRESH_BONUS: f64 = 0.10;
const STALE_PENALTY: f64 = 0.10;

/// Term lists. Extra CLI terms are appended lowercased and deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceTerms {
    pub include_terms: Vec<String>,
    pub include_phrases: Vec<String>,
    pub exclude_terms: Vec<String>,
    pub exclude_phrases: Vec<String>,
}

impl Default for RelevanceTerms {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            include_terms: owned(INCLUDE_TERMS),
            include_phrases: owned(INCLUDE_PHRASES),
            exclude_terms: owned(EXCLUDE_TERMS),
            exclude_phrases: Vec::new(),
        }
    }
}

impl RelevanceTerms {
    pub fn with_extra(mut self, include: &[String], exclude: &[String]) -> Self {
        extend_dedup(&mut self.include_terms, include);
        extend_dedup(&mut self.exclude_terms, exclude);
        self
    }
}

fn extend_dedup(base: &mut Vec<String>, extra: &[String]) {
    for t in extra {
        let t = t.trim().to_lowercase();
        if !t.is_empty() && !base.contains(&t) {
            base.push(t);
        }
    }
}

/// Compiled relevance scorer.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    include_terms: Vec<Regex>,
    include_phrases: Vec<Regex>,
    exclude_terms: Vec<Regex>,
    exclude_phrases: Vec<Regex>,
}

fn compile(terms: &[String]) -> Result<Vec<Regex>, PatternError> {
    terms
        .iter()
        .map(|t| {
            RegexBuilder::new(&format!(r"\b{}\b", regex::escape(&t.to_lowercase())))
                .case_insensitive(true)
                .build()
                .map_err(|e| PatternError::CompilationFailed {
                    feature: format!("relevance:{t}"),
                    message: e.to_string(),
                })
        })
        .collect()
}

fn allowed_category(store: &Store, category: &str) -> bool {
    let allowed: &[&str] = match store {
        Store::PlayStore => &["PRODUCTIVITY", "EDUCATION", "HEALTH_AND_FITNESS"],
        Store::ChromeWebStore => &["Productivity", "Education", "Utilities"],
        Store::AppStore => &["Productivity", "Education", "Health & Fitness"],
        Store::Other(_) => &[],
    };
    allowed.contains(&category)
}

/// `cap * min(1, log10(x) / 7)`; zero for non-positive input.
fn log_bonus(x: f64, cap: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    cap * (x.log10() / 7.0).min(1.0)
}

impl RelevanceScorer {
    pub fn new(terms: &RelevanceTerms) -> Result<Self, PatternError> {
        Ok(Self {
            include_terms: compile(&terms.include_terms)?,
            include_phrases: compile(&terms.include_phrases)?,
            exclude_terms: compile(&terms.exclude_terms)?,
            exclude_phrases: compile(&terms.exclude_phrases)?,
        })
    }

    pub fn builtin() -> Result<Self, PatternError> {
        Self::new(&RelevanceTerms::default())
    }

    fn field_score(&self, text: &str, (weight, term_mult, exc_mult): (f64, f64, f64)) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let count = |res: &[Regex]| -> f64 {
            res.iter().map(|r| r.find_iter(text).count() as f64).sum()
        };
        let present = |res: &[Regex]| -> f64 {
            res.iter().filter(|r| r.is_match(text)).count() as f64
        };
        let score = term_mult * count(&self.include_terms)
            + PHRASE_BONUS * present(&self.include_phrases)
            - exc_mult * count(&self.exclude_terms)
            - PHRASE_BONUS * exc_mult * present(&self.exclude_phrases);
        score * weight
    }

    /// Score against a fixed `today` so results are reproducible.
    pub fn score(&self, app: &AppRecord, today: NaiveDate) -> f64 {
        let field = |v: &Option<String>| v.as_deref().unwrap_or("").to_lowercase();
        let category_raw = app.category.as_deref().unwrap_or("");
        let category = category_raw.to_lowercase();

        let text_score = self.field_score(&field(&app.title), TITLE_WEIGHTS)
            + self.field_score(&category, CATEGORY_WEIGHTS)
            + self.field_score(&field(&app.description), DESCRIPTION_WEIGHTS)
            + self.field_score(&field(&app.developer), DEVELOPER_WEIGHTS);
        let text_part = (text_score / TEXT_SCALE).clamp(0.0, 1.0);

        let mut category_bonus = 0.0;
        if let Some(store) = &app.store {
            if allowed_category(store, category_raw.trim()) {
                category_bonus = CATEGORY_BONUS;
            }
        }
        if JUNK_CATEGORY_MARKERS.iter().any(|m| category.contains(m)) {
            category_bonus -= JUNK_CATEGORY_PENALTY;
        }

        let ratings_bonus = log_bonus(app.rating_count.unwrap_or(0) as f64, RATINGS_MAX_BONUS);
        let installs_bonus = log_bonus(app.installs_or_users.unwrap_or(0) as f64, INSTALLS_MAX_BONUS);

        let recency = match app.last_update {
            Some(lu) => {
                let days = (today - lu).num_days();
                if days <= FRESH_DAYS {
                    FRESH_BONUS
                } else if days >= STALE_DAYS {
                    -STALE_PENALTY
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        let score = text_part + category_bonus + ratings_bonus + installs_bonus + recency;
        (score.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
    }
}
