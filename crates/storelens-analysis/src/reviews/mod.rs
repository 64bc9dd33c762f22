//! Review-side stages: corpus matching, special tagging, dedup, per-feature stats.

pub mod corpus;
pub mod dedup;
pub mod feature_stats;
pub mod special;

pub use corpus::{count_review_hits, ReviewCorpus};
pub use dedup::{content_hash, normalize_review_text, DedupStats, ReviewDeduper};
pub use feature_stats::{feature_review_stats, FeatureReviewStat};
pub use special::SpecialDetector;
