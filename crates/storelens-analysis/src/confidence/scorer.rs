//! Rule-table confidence scoring.

use super::types::{EvidenceTier, ScoringPolicy, Verdict};
use crate::evidence::SourceSet;

/// Applies a [`ScoringPolicy`]. Deterministic; zero evidence is a
/// `not_flagged` verdict, never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer {
    policy: ScoringPolicy,
}

impl ConfidenceScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn score(&self, sources: &SourceSet, review_hits: u32) -> Verdict {
        self.score_counts(sources.len() as u32, review_hits)
    }

    /// Score from the number of distinct matched sources.
    pub fn score_counts(&self, n_sources: u32, review_hits: u32) -> Verdict {
        let p = &self.policy;
        let (tier, confidence) = if n_sources >= p.min_sources_for_multi {
            (EvidenceTier::MultiSource, p.multi_source_confidence)
        } else if n_sources >= 1 && review_hits >= p.corroboration_review_hits {
            (EvidenceTier::Corroborated, p.corroborated_confidence)
        } else if n_sources >= 1 {
            (EvidenceTier::SingleSource, p.single_source_confidence)
        } else if review_hits >= p.reviews_only_review_hits {
            (EvidenceTier::ReviewsOnly, p.reviews_only_confidence)
        } else {
            return Verdict::not_flagged();
        };
        Verdict {
            flagged: true,
            confidence,
            tier,
        }
    }
}
