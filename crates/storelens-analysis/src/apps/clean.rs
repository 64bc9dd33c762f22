//! App table cleaning: dedup by key, then viability, popularity and
//! relevance gates.

use std::cmp::Ordering;

use storelens_core::config::CleaningConfig;
use storelens_core::types::{AppKey, AppRecord, FxHashMap, Store};

/// Gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleaningPolicy {
    pub min_rating_count: u64,
    pub min_play_installs: u64,
    pub min_cws_users: u64,
    pub min_relevance: f64,
}

impl Default for CleaningPolicy {
    fn default() -> Self {
        Self::from_config(&CleaningConfig::default())
    }
}

impl CleaningPolicy {
    pub fn from_config(config: &CleaningConfig) -> Self {
        Self {
            min_rating_count: config.effective_min_rating_count(),
            min_play_installs: config.effective_min_play_installs(),
            min_cws_users: config.effective_min_cws_users(),
            min_relevance: config.effective_min_relevance(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingTitleAndDescription,
    BelowPopularityThresholds,
    LowRelevance,
}

impl DropReason {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MissingTitleAndDescription => "missing_title_and_description",
            Self::BelowPopularityThresholds => "below_popularity_thresholds",
            Self::LowRelevance => "low_relevance",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedApp {
    pub app: AppRecord,
    pub reasons: Vec<DropReason>,
}

impl DroppedApp {
    /// Comma-joined reason names, `unknown` when none were recorded.
    pub fn drop_reason(&self) -> String {
        if self.reasons.is_empty() {
            return "unknown".to_string();
        }
        self.reasons
            .iter()
            .map(DropReason::name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanOutcome {
    pub kept: Vec<AppRecord>,
    pub dropped: Vec<DroppedApp>,
}

/// Ensure every row has a key: computed from store and id, else the row index.
fn fill_key(app: &mut AppRecord, index: usize) {
    if !app.app_key.is_empty() {
        return;
    }
    app.app_key = match (&app.store, app.id.as_deref()) {
        (Some(store), Some(id)) if !id.trim().is_empty() => AppKey::compute(store, id),
        _ => AppKey::new(index.to_string()),
    };
}

/// Later scrape wins; a missing scrape date loses; then more ratings win.
fn newer(a: &AppRecord, b: &AppRecord) -> bool {
    let by_date = match (a.scraped_at, b.scraped_at) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    match by_date {
        Ordering::Equal => a.rating_count.unwrap_or(0) > b.rating_count.unwrap_or(0),
        o => o == Ordering::Greater,
    }
}

fn dedup(apps: Vec<AppRecord>) -> Vec<AppRecord> {
    let mut slot: FxHashMap<AppKey, usize> = FxHashMap::default();
    let mut out: Vec<AppRecord> = Vec::with_capacity(apps.len());
    for app in apps {
        match slot.get(&app.app_key) {
            Some(&i) => {
                if newer(&app, &out[i]) {
                    out[i] = app;
                }
            }
            None => {
                slot.insert(app.app_key.clone(), out.len());
                out.push(app);
            }
        }
    }
    out
}

fn has_viable_text(app: &AppRecord) -> bool {
    let title = app.title.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let description = app
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    match title {
        Some(t) => t.chars().count() >= 2,
        None => description.is_some(),
    }
}

fn is_popular(app: &AppRecord, policy: &CleaningPolicy) -> bool {
    if app.rating_count.unwrap_or(0) >= policy.min_rating_count {
        return true;
    }
    let installs = app.installs_or_users.unwrap_or(0);
    match app.store {
        Some(Store::PlayStore) => installs >= policy.min_play_installs,
        Some(Store::ChromeWebStore) => installs >= policy.min_cws_users,
        _ => false,
    }
}

/// Dedup by key, then split into kept and dropped rows.
pub fn clean_apps(mut apps: Vec<AppRecord>, policy: &CleaningPolicy) -> CleanOutcome {
    let input = apps.len();
    for (i, app) in apps.iter_mut().enumerate() {
        fill_key(app, i);
    }
    let unique = dedup(apps);
    let duplicates = input - unique.len();

    let mut outcome = CleanOutcome::default();
    for app in unique {
        let mut reasons = Vec::new();
        if !has_viable_text(&app) {
            reasons.push(DropReason::MissingTitleAndDescription);
        }
        if !is_popular(&app, policy) {
            reasons.push(DropReason::BelowPopularityThresholds);
        }
        if app.relevance_score.unwrap_or(0.0) < policy.min_relevance {
            reasons.push(DropReason::LowRelevance);
        }
        if reasons.is_empty() {
            outcome.kept.push(app);
        } else {
            tracing::debug!(app_key = %app.app_key, reasons = ?reasons, "app dropped");
            outcome.dropped.push(DroppedApp { app, reasons });
        }
    }

    tracing::info!(
        input,
        duplicates,
        kept = outcome.kept.len(),
        dropped = outcome.dropped.len(),
        "apps cleaned"
    );
    outcome
}
