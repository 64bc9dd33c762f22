//! Rater labels collapsed per (app_key, feature, rater).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use storelens_core::constants::{HEURISTIC_RATER, HUMAN_RATER};
use storelens_core::types::{AppKey, FxHashMap};

use crate::flags::FeatureLabel;
use crate::matrix::LongRow;

/// One rater's binary judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaterLabel {
    pub app_key: AppKey,
    pub feature: String,
    pub rater: String,
    pub present: bool,
}

impl From<&FeatureLabel> for RaterLabel {
    fn from(label: &FeatureLabel) -> Self {
        Self {
            app_key: label.app_key.clone(),
            feature: label.feature.clone(),
            rater: label.rater.clone(),
            present: label.present,
        }
    }
}

/// A long-table row read back as a heuristic judgment.
impl From<&LongRow> for RaterLabel {
    fn from(row: &LongRow) -> Self {
        Self {
            app_key: row.app_key.clone(),
            feature: row.feature.clone(),
            rater: HEURISTIC_RATER.to_string(),
            present: row.flag,
        }
    }
}

pub type ItemKey = (AppKey, String);

/// Labels grouped by rater, raters in name order. Duplicate
/// (app_key, feature, rater) rows collapse by max (any `present` wins).
#[derive(Debug, Clone, Default)]
pub struct RaterTable {
    by_rater: BTreeMap<String, FxHashMap<ItemKey, bool>>,
}

impl RaterTable {
    pub fn from_labels<I: IntoIterator<Item = RaterLabel>>(labels: I) -> Self {
        let mut table = Self::default();
        table.extend(labels);
        table
    }

    pub fn extend<I: IntoIterator<Item = RaterLabel>>(&mut self, labels: I) {
        for l in labels {
            let rater = l.rater.trim();
            if rater.is_empty() || l.app_key.is_empty() {
                continue;
            }
            let cell = self
                .by_rater
                .entry(rater.to_string())
                .or_default()
                .entry((l.app_key, l.feature))
                .or_insert(false);
            *cell |= l.present;
        }
    }

    /// Add labels from a human file as rater `human`, whatever rater
    /// names the rows carry.
    pub fn add_human<I: IntoIterator<Item = RaterLabel>>(&mut self, labels: I) {
        self.extend(labels.into_iter().map(|mut l| {
            l.rater = HUMAN_RATER.to_string();
            l
        }));
    }

    pub fn raters(&self) -> impl Iterator<Item = &str> {
        self.by_rater.keys().map(String::as_str)
    }

    pub fn rater_count(&self) -> usize {
        self.by_rater.len()
    }

    pub fn labels(&self, rater: &str) -> Option<&FxHashMap<ItemKey, bool>> {
        self.by_rater.get(rater)
    }

    /// App keys labeled by any rater, sorted.
    pub fn app_keys(&self) -> BTreeSet<AppKey> {
        self.by_rater
            .values()
            .flat_map(|labels| labels.keys().map(|(k, _)| k.clone()))
            .collect()
    }

    /// Features labeled by `rater`, sorted.
    pub fn features_of(&self, rater: &str) -> BTreeSet<String> {
        self.labels(rater)
            .map(|labels| labels.keys().map(|(_, f)| f.clone()).collect())
            .unwrap_or_default()
    }

    /// Record `present = false` for `rater` on every (app, feature) it has
    /// not labeled. For raters that only write positives, such as the
    /// heuristic feature files. Returns the number of cells added.
    pub fn fill_absent<'a, A, F>(&mut self, rater: &str, apps: A, features: F) -> usize
    where
        A: IntoIterator<Item = &'a AppKey>,
        F: IntoIterator<Item = &'a String> + Clone,
    {
        let labels = self.by_rater.entry(rater.to_string()).or_default();
        let mut added = 0;
        for app in apps {
            for feature in features.clone() {
                labels
                    .entry((app.clone(), feature.clone()))
                    .or_insert_with(|| {
                        added += 1;
                        false
                    });
            }
        }
        added
    }

    /// Items both raters labeled, as (a, b) judgments in item order.
    pub fn overlap(&self, a: &str, b: &str) -> Vec<(bool, bool)> {
        let (Some(la), Some(lb)) = (self.labels(a), self.labels(b)) else {
            return Vec::new();
        };
        let mut items: Vec<(&ItemKey, bool, bool)> = la
            .iter()
            .filter_map(|(k, &va)| lb.get(k).map(|&vb| (k, va, vb)))
            .collect();
        items.sort_by(|x, y| x.0.cmp(y.0));
        items.into_iter().map(|(_, va, vb)| (va, vb)).collect()
    }
}
