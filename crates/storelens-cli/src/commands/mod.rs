//! One module per stage. Every `run` takes the resolved config and
//! returns the stdout summary.

pub mod agreement;
pub mod apps;
pub mod classify;
pub mod flags;
pub mod llm;
pub mod matrix;
pub mod reviews;
pub mod sentiment;

use std::path::{Path, PathBuf};

use clap::Subcommand;

use storelens_analysis::patterns::PatternLibrary;
use storelens_core::config::{
    CliOverrides, DedupeScope, PromptStyle, SentimentWeighting, StorelensConfig,
};
use storelens_core::errors::PipelineError;

pub use agreement::AgreementArgs;
pub use apps::{CleanArgs, NormalizeArgs};
pub use classify::ClassifyArgs;
pub use flags::{FlagsArgs, ReviewStatsArgs};
pub use llm::FlattenLlmArgs;
pub use matrix::MatrixArgs;
pub use reviews::DedupReviewsArgs;
pub use sentiment::SentimentArgs;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Raw scrape dump to the canonical app table.
    Normalize(NormalizeArgs),
    /// Deduplicate apps and apply quality gates.
    Clean(CleanArgs),
    /// Merge review tables, drop duplicates, tag special reviews.
    DedupReviews(DedupReviewsArgs),
    /// Score reviews and aggregate per (app, store, country).
    Sentiment(SentimentArgs),
    /// Heuristic feature labels for one feature or all of them.
    Flags(FlagsArgs),
    /// Merge label files into matrices, a long table and a bundle.
    Matrix(MatrixArgs),
    /// Per (app, feature) review match counts, ratings and sentiment.
    ReviewStats(ReviewStatsArgs),
    /// Flatten labeler responses to one row per (app, feature).
    FlattenLlm(FlattenLlmArgs),
    /// Pairwise Cohen's kappa across raters.
    Agreement(AgreementArgs),
    /// Run an external classifier over the app table.
    Classify(ClassifyArgs),
}

impl Command {
    /// Flags that override resolved configuration values.
    pub fn overrides(&self) -> CliOverrides {
        let mut o = CliOverrides::default();
        match self {
            Self::Normalize(_) | Self::FlattenLlm(_) => {}
            Self::Agreement(a) => o.patterns_path = a.patterns.clone(),
            Self::Clean(a) => {
                o.min_rating_count = a.min_rating_count;
                o.min_play_installs = a.min_play_installs;
                o.min_cws_users = a.min_cws_users;
                o.min_relevance = a.min_relevance;
            }
            Self::DedupReviews(a) => o.dedupe_scope = a.dedupe_scope,
            Self::Sentiment(a) => {
                o.since_days = a.since_days;
                o.min_words = a.min_words;
                o.min_chars = a.min_chars;
                o.special_only = a.special_only.then_some(true);
                o.drop_neutrals_for_agg = a.drop_neutrals.then_some(true);
            }
            Self::Flags(a) => o.patterns_path = a.patterns.clone(),
            Self::ReviewStats(a) => o.patterns_path = a.patterns.clone(),
            Self::Matrix(a) => {
                o.min_confidence = a.min_confidence;
                o.min_review_hits = a.min_review_hits;
                o.sentiment_weighting = a.sentiment_weighting;
            }
            Self::Classify(a) => {
                o.patterns_path = a.patterns.clone();
                o.max_attempts = a.max_attempts;
                o.sleep_ms = a.sleep_ms;
                o.resume = a.resume.then_some(true);
                o.timeout_ms = a.timeout_ms;
                o.prompt = a.prompt;
            }
        }
        o
    }

    pub fn run(&self, config: &StorelensConfig) -> Result<String, PipelineError> {
        match self {
            Self::Normalize(a) => apps::normalize(a),
            Self::Clean(a) => apps::clean(a, config),
            Self::DedupReviews(a) => reviews::dedup(a, config),
            Self::Sentiment(a) => sentiment::run(a, config),
            Self::Flags(a) => flags::run(a, config),
            Self::Matrix(a) => matrix::run(a, config),
            Self::ReviewStats(a) => flags::review_stats(a, config),
            Self::FlattenLlm(a) => llm::flatten(a),
            Self::Agreement(a) => agreement::run(a, config),
            Self::Classify(a) => classify::run(a, config),
        }
    }
}

pub(crate) fn parse_weighting(s: &str) -> Result<SentimentWeighting, String> {
    SentimentWeighting::parse(s).ok_or_else(|| format!("expected weighted or unweighted, got {s:?}"))
}

pub(crate) fn parse_scope(s: &str) -> Result<DedupeScope, String> {
    DedupeScope::parse(s).ok_or_else(|| format!("expected global or country, got {s:?}"))
}

pub(crate) fn parse_prompt(s: &str) -> Result<PromptStyle, String> {
    PromptStyle::parse(s).ok_or_else(|| format!("expected goldilocks or presence, got {s:?}"))
}

/// The configured pattern file, else the built-in library.
pub(crate) fn load_library(config: &StorelensConfig) -> Result<PatternLibrary, PipelineError> {
    Ok(PatternLibrary::load(
        config.scoring.patterns_path.as_deref().map(Path::new),
    )?)
}

/// Directory holding `path`, or `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
