//! Shared constants for the storelens pipeline.

/// storelens version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---- Confidence policy ----

/// Confidence when two or more distinct non-review sources matched.
pub const DEFAULT_MULTI_SOURCE_CONFIDENCE: f64 = 0.80;

/// Confidence for one source corroborated by enough review hits.
pub const DEFAULT_CORROBORATED_CONFIDENCE: f64 = 0.70;

/// Confidence for one source without review corroboration.
pub const DEFAULT_SINGLE_SOURCE_CONFIDENCE: f64 = 0.60;

/// Confidence for a purely review-derived signal.
pub const DEFAULT_REVIEWS_ONLY_CONFIDENCE: f64 = 0.55;

/// Distinct sources needed for the multi-source tier.
pub const DEFAULT_MIN_SOURCES_FOR_MULTI: u32 = 2;

/// Review hits that upgrade a single-source match.
pub const DEFAULT_CORROBORATION_REVIEW_HITS: u32 = 10;

/// Review hits needed for a reviews-only flag.
pub const DEFAULT_REVIEWS_ONLY_REVIEW_HITS: u32 = 25;

// ---- Sentiment ----

/// Compound score at or above which a review is positive.
pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound score at or below which a review is negative.
pub const DEFAULT_NEGATIVE_THRESHOLD: f64 = -0.05;

// ---- Cleaning ----

pub const DEFAULT_MIN_RATING_COUNT: u64 = 10;
pub const DEFAULT_MIN_PLAY_INSTALLS: u64 = 50_000;
pub const DEFAULT_MIN_CWS_USERS: u64 = 10_000;
pub const DEFAULT_MIN_RELEVANCE: f64 = 0.15;

// ---- External calls ----

/// Attempts per external call before the item is recorded as failed.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Politeness delay between sequential external calls.
pub const DEFAULT_SLEEP_MS: u64 = 600;

/// Time budget for one external call.
pub const DEFAULT_TIMEOUT_MS: u64 = 180_000;

// ---- Artifact names ----

/// Prefix of per-feature label files.
pub const FEATURE_FILE_PREFIX: &str = "features_";

pub const MATRIX_FLAGS_FILE: &str = "features_matrix_flags.csv";
pub const MATRIX_CONFIDENCE_FILE: &str = "features_matrix_confidence.csv";
pub const MATRIX_REVIEW_HITS_FILE: &str = "features_matrix_review_hits.csv";
pub const FEATURES_LONG_FILE: &str = "features_long.csv";
pub const FEATURES_BUNDLE_FILE: &str = "features_bundle.csv";

/// Derived artifacts that share the feature prefix but are not label files.
pub const FEATURE_FILE_EXCLUDES: [&str; 5] = [
    MATRIX_FLAGS_FILE,
    MATRIX_CONFIDENCE_FILE,
    MATRIX_REVIEW_HITS_FILE,
    FEATURES_LONG_FILE,
    FEATURES_BUNDLE_FILE,
];

/// Rater name used for the built-in heuristic engine.
pub const HEURISTIC_RATER: &str = "heuristic";

/// Rater name used for human labels.
pub const HUMAN_RATER: &str = "human";
