//! Wide matrices pivoted from the long table.

use std::collections::{BTreeMap, BTreeSet};

use storelens_core::types::AppKey;

use super::long::LongRow;

/// App-indexed x feature-indexed table. Apps iterate in key order and
/// feature columns are sorted; absent cells hold the fill value.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix<T> {
    features: Vec<String>,
    rows: BTreeMap<AppKey, Vec<T>>,
}

impl<T: Copy> FeatureMatrix<T> {
    fn build(
        long: &[LongRow],
        features: &[String],
        fill: T,
        value: impl Fn(&LongRow) -> T,
        combine: impl Fn(T, T) -> T,
    ) -> Self {
        let mut rows: BTreeMap<AppKey, Vec<T>> = BTreeMap::new();
        for r in long {
            let Ok(col) = features.binary_search(&r.feature) else {
                continue;
            };
            let cells = rows
                .entry(r.app_key.clone())
                .or_insert_with(|| vec![fill; features.len()]);
            cells[col] = combine(cells[col], value(r));
        }
        Self {
            features: features.to_vec(),
            rows,
        }
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn app_keys(&self) -> impl Iterator<Item = &AppKey> {
        self.rows.keys()
    }

    /// Rows in app_key order, cells in feature order.
    pub fn rows(&self) -> impl Iterator<Item = (&AppKey, &[T])> {
        self.rows.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn get(&self, app_key: &AppKey, feature: &str) -> Option<T> {
        let col = self.features.iter().position(|f| f == feature)?;
        self.rows.get(app_key).map(|cells| cells[col])
    }

    pub fn app_count(&self) -> usize {
        self.rows.len()
    }
}

/// Presence (max, fill 0), confidence (max, fill 0.0), review hits
/// (sum, fill 0).
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixSet {
    pub flags: FeatureMatrix<u8>,
    pub confidence: FeatureMatrix<f64>,
    pub review_hits: FeatureMatrix<u64>,
}

impl MatrixSet {
    /// Rebuilt wholesale from the long table on every call.
    pub fn pivot(long: &[LongRow]) -> Self {
        let features: Vec<String> = long
            .iter()
            .map(|r| r.feature.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let flags = FeatureMatrix::build(long, &features, 0u8, |r| u8::from(r.flag), u8::max);
        let confidence =
            FeatureMatrix::build(long, &features, 0.0f64, |r| r.confidence, f64::max);
        let review_hits =
            FeatureMatrix::build(long, &features, 0u64, |r| r.review_hits, |a, b| a + b);

        tracing::debug!(
            apps = flags.app_count(),
            features = features.len(),
            "matrices pivoted"
        );
        Self {
            flags,
            confidence,
            review_hits,
        }
    }
}

/// Nonzero presence cells back to (app_key, feature) pairs.
pub fn flatten_flags(flags: &FeatureMatrix<u8>) -> Vec<(AppKey, String)> {
    flags
        .rows()
        .flat_map(|(key, cells)| {
            cells
                .iter()
                .zip(flags.features())
                .filter(|(v, _)| **v > 0)
                .map(move |(_, f)| (key.clone(), f.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(key: &str, feature: &str, flag: bool, conf: f64, hits: u64) -> LongRow {
        LongRow {
            app_key: AppKey::new(key),
            feature: feature.into(),
            flag,
            confidence: conf,
            review_hits: hits,
        }
    }

    #[test]
    fn test_pivot_sorted_and_filled() {
        let rows = vec![
            long("play:b", "timer", true, 0.6, 3),
            long("play:a", "blocking", true, 0.8, 0),
            long("play:a", "timer", false, 0.0, 1),
        ];
        let m = MatrixSet::pivot(&rows);
        assert_eq!(m.flags.features(), &["blocking".to_string(), "timer".to_string()]);
        let keys: Vec<&str> = m.flags.app_keys().map(AppKey::as_str).collect();
        assert_eq!(keys, vec!["play:a", "play:b"]);
        assert_eq!(m.flags.get(&AppKey::new("play:b"), "blocking"), Some(0));
        assert_eq!(m.confidence.get(&AppKey::new("play:a"), "blocking"), Some(0.8));
        assert_eq!(m.review_hits.get(&AppKey::new("play:a"), "timer"), Some(1));
    }

    #[test]
    fn test_round_trip_flags() {
        let rows = vec![
            long("play:a", "blocking", true, 0.8, 0),
            long("play:a", "timer", false, 0.0, 0),
            long("ios:id1", "timer", true, 0.6, 2),
        ];
        let m = MatrixSet::pivot(&rows);
        let pairs = flatten_flags(&m.flags);
        assert_eq!(
            pairs,
            vec![
                (AppKey::new("ios:id1"), "timer".to_string()),
                (AppKey::new("play:a"), "blocking".to_string()),
            ]
        );
    }
}
