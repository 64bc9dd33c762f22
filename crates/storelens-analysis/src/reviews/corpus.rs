//! Review corpus matcher.

use storelens_core::types::{AppKey, FxHashMap, ReviewRecord};

use crate::patterns::FeatureDefinition;

/// Number of reviews in which at least one matcher fires.
/// A review counts once however many matchers hit it.
pub fn count_review_hits<S: AsRef<str>>(texts: &[S], feature: &FeatureDefinition) -> u32 {
    texts
        .iter()
        .filter(|t| feature.is_match(t.as_ref()))
        .count() as u32
}

/// Review match texts grouped by app, built once per run.
#[derive(Debug, Default)]
pub struct ReviewCorpus {
    by_app: FxHashMap<AppKey, Vec<String>>,
    total: usize,
}

impl ReviewCorpus {
    /// Index reviews by `app_key`. Reviews with no text keep an empty entry
    /// so they are counted as reviews that match nothing.
    pub fn from_reviews(reviews: &[ReviewRecord]) -> Self {
        let mut by_app: FxHashMap<AppKey, Vec<String>> = FxHashMap::default();
        for r in reviews {
            by_app
                .entry(r.app_key.clone())
                .or_default()
                .push(r.match_text());
        }
        Self {
            by_app,
            total: reviews.len(),
        }
    }

    /// Texts for one app; empty when the app has no reviews.
    pub fn texts(&self, app_key: &AppKey) -> &[String] {
        self.by_app.get(app_key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count_hits(&self, app_key: &AppKey, feature: &FeatureDefinition) -> u32 {
        count_review_hits(self.texts(app_key), feature)
    }

    pub fn app_count(&self) -> usize {
        self.by_app.len()
    }

    /// Total reviews indexed.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternLibrary;

    fn review(key: &str, body: Option<&str>) -> ReviewRecord {
        let mut r = ReviewRecord::new(key);
        r.body = body.map(str::to_string);
        r
    }

    #[test]
    fn test_counts_reviews_not_occurrences() {
        let lib = PatternLibrary::builtin().unwrap();
        let timer = lib.feature("timer").unwrap();
        let reviews = vec![
            review("play:a", Some("timer timer timers, countdown too")),
            review("play:a", Some("love the timer")),
            review("play:a", None),
            review("play:a", Some("nothing relevant")),
            review("play:b", Some("timer")),
        ];
        let corpus = ReviewCorpus::from_reviews(&reviews);
        assert_eq!(corpus.count_hits(&AppKey::new("play:a"), timer), 2);
        assert_eq!(corpus.count_hits(&AppKey::new("play:c"), timer), 0);
        assert_eq!(corpus.len(), 5);
        assert_eq!(corpus.app_count(), 2);
    }
}
