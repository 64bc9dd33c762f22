//! Review deduplication across (store x country) scrapes.
//!
//! Two keys per review: the review id (exact repeats) and an xxh3 hash of
//! the normalized text (the same review surfacing in several countries).
//! Scope `global` keys on app; scope `country` also keys on country.

use std::sync::LazyLock;

use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

use storelens_core::config::DedupeScope;
use storelens_core::types::{AppKey, FxHashMap, FxHashSet, ReviewRecord, Store};

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+|www\.\S+").unwrap());

static PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, drop URLs and punctuation, collapse whitespace.
pub fn normalize_review_text(title: Option<&str>, body: Option<&str>) -> String {
    let t = title.unwrap_or("").trim().to_lowercase();
    let b = body.unwrap_or("").trim().to_lowercase();
    let joined = format!("{t} {b}");
    let s = URL_RE.replace_all(joined.trim(), " ");
    let s = PUNCT_RE.replace_all(&s, " ");
    SPACE_RE.replace_all(&s, " ").trim().to_string()
}

/// xxh3-64 of `app_key|normalized text`.
pub fn content_hash(app_key: &AppKey, title: Option<&str>, body: Option<&str>) -> u64 {
    let normalized = normalize_review_text(title, body);
    xxh3_64(format!("{}|{}", app_key.as_str(), normalized).as_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScopedKey<T> {
    app_key: AppKey,
    country: Option<String>,
    value: T,
}

/// Counters reported by a dedup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    pub input: usize,
    pub duplicate_ids: usize,
    pub duplicate_texts: usize,
    pub replaced: usize,
    pub output: usize,
}

/// Streaming deduper; feed reviews in any order, then [`finish`](Self::finish).
#[derive(Debug)]
pub struct ReviewDeduper {
    scope: DedupeScope,
    seen_ids: FxHashSet<ScopedKey<String>>,
    best_by_text: FxHashMap<ScopedKey<u64>, usize>,
    rows: Vec<ReviewRecord>,
    stats: DedupStats,
}

impl ReviewDeduper {
    pub fn new(scope: DedupeScope) -> Self {
        Self {
            scope,
            seen_ids: FxHashSet::default(),
            best_by_text: FxHashMap::default(),
            rows: Vec::new(),
            stats: DedupStats::default(),
        }
    }

    fn scoped<T>(&self, app_key: &AppKey, country: Option<&str>, value: T) -> ScopedKey<T> {
        ScopedKey {
            app_key: app_key.clone(),
            country: match self.scope {
                DedupeScope::Global => None,
                DedupeScope::Country => Some(country.unwrap_or("").to_string()),
            },
            value,
        }
    }

    pub fn push(&mut self, mut review: ReviewRecord) {
        self.stats.input += 1;

        if review.app_key.is_empty() {
            if let (Some(store), Some(app_id)) = (review.store.as_deref(), review.app_id.as_deref()) {
                review.app_key = AppKey::compute(&Store::parse(store), app_id);
            }
        }

        let rid = review
            .review_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let id_key = rid
            .map(|id| self.scoped(&review.app_key, review.country.as_deref(), id));
        if let Some(k) = &id_key {
            if self.seen_ids.contains(k) {
                self.stats.duplicate_ids += 1;
                return;
            }
        }

        let hash = content_hash(&review.app_key, review.title.as_deref(), review.body.as_deref());
        let text_key = self.scoped(&review.app_key, review.country.as_deref(), hash);

        match self.best_by_text.get(&text_key) {
            Some(&idx) => {
                self.stats.duplicate_texts += 1;
                if prefer_new(&self.rows[idx], &review) {
                    self.rows[idx] = review;
                    self.stats.replaced += 1;
                }
            }
            None => {
                self.best_by_text.insert(text_key, self.rows.len());
                self.rows.push(review);
            }
        }

        if let Some(k) = id_key {
            self.seen_ids.insert(k);
        }
    }

    /// Surviving reviews in first-seen order of their content key.
    pub fn finish(mut self) -> (Vec<ReviewRecord>, DedupStats) {
        self.stats.output = self.rows.len();
        (self.rows, self.stats)
    }
}

/// Newer timestamp wins; a timestamp beats none; else the longer body.
/// Ties keep the existing row.
fn prefer_new(current: &ReviewRecord, candidate: &ReviewRecord) -> bool {
    match (current.at, candidate.at) {
        (Some(cur), Some(new)) => new > cur,
        (None, Some(_)) => true,
        (Some(_), None) => false,
        (None, None) => candidate.body_len() > current.body_len(),
    }
}
