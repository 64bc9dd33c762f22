//! Iterates apps x features through collector, corpus matcher, and scorer.

use std::cmp::Ordering;

use rayon::prelude::*;

use storelens_core::constants::HEURISTIC_RATER;
use storelens_core::errors::PatternError;
use storelens_core::types::{AppKey, AppRecord, FxHashMap};

use super::types::{FeatureLabel, FlagRun};
use crate::confidence::ConfidenceScorer;
use crate::evidence::{self, EvidenceText};
use crate::patterns::{FeatureDefinition, PatternLibrary};
use crate::reviews::ReviewCorpus;

/// Heuristic rater over an explicit pattern library.
pub struct FeatureFlagDriver<'a> {
    library: &'a PatternLibrary,
    scorer: ConfidenceScorer,
}

impl<'a> FeatureFlagDriver<'a> {
    pub fn new(library: &'a PatternLibrary, scorer: ConfidenceScorer) -> Self {
        Self { library, scorer }
    }

    /// Label one feature across all apps.
    ///
    /// An app with no reviews is a zero-hit case, not a failure.
    pub fn run_feature(
        &self,
        feature: &str,
        apps: &[AppRecord],
        websites: &FxHashMap<AppKey, String>,
        corpus: &ReviewCorpus,
    ) -> Result<FlagRun, PatternError> {
        let def = self.library.require(feature)?;
        let texts: Vec<EvidenceText<'_>> = apps
            .iter()
            .map(|a| EvidenceText::from_app(a, websites.get(&a.app_key).map(String::as_str)))
            .collect();
        Ok(self.run_definition(def, apps, &texts, corpus))
    }

    /// Label every feature, features in parallel, results in library order.
    pub fn run_all(
        &self,
        apps: &[AppRecord],
        websites: &FxHashMap<AppKey, String>,
        corpus: &ReviewCorpus,
    ) -> Vec<FlagRun> {
        let texts: Vec<EvidenceText<'_>> = apps
            .iter()
            .map(|a| EvidenceText::from_app(a, websites.get(&a.app_key).map(String::as_str)))
            .collect();
        self.library
            .features()
            .par_iter()
            .map(|def| self.run_definition(def, apps, &texts, corpus))
            .collect()
    }

    fn run_definition(
        &self,
        def: &FeatureDefinition,
        apps: &[AppRecord],
        texts: &[EvidenceText<'_>],
        corpus: &ReviewCorpus,
    ) -> FlagRun {
        let mut labels = Vec::new();
        for (app, text) in apps.iter().zip(texts) {
            let sources = evidence::collect(text, def);
            let review_hits = corpus.count_hits(&app.app_key, def);
            let verdict = self.scorer.score(&sources, review_hits);
            if !verdict.flagged {
                continue;
            }
            labels.push(FeatureLabel {
                app_key: app.app_key.clone(),
                title: app.title.clone().unwrap_or_default(),
                feature: def.name().to_string(),
                rater: HEURISTIC_RATER.to_string(),
                present: true,
                confidence: verdict.confidence,
                tier: verdict.tier,
                sources,
                review_hits,
            });
        }

        labels.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.review_hits.cmp(&a.review_hits))
                .then_with(|| a.title.cmp(&b.title))
        });

        tracing::debug!(
            feature = def.name(),
            flagged = labels.len(),
            total = apps.len(),
            "feature labeled"
        );

        FlagRun {
            feature: def.name().to_string(),
            labels,
            total_apps: apps.len(),
        }
    }
}
