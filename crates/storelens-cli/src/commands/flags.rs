//! `flags` and `review-stats`.

use std::path::{Path, PathBuf};

use clap::Args;

use storelens_analysis::confidence::{ConfidenceScorer, ScoringPolicy};
use storelens_analysis::flags::{FeatureFlagDriver, FlagRun};
use storelens_analysis::reviews::{feature_review_stats, ReviewCorpus};
use storelens_core::config::StorelensConfig;
use storelens_core::errors::PipelineError;
use storelens_core::types::{AppKey, FxHashMap, ReviewRecord};
use storelens_storage::tables::apps::read_apps;
use storelens_storage::tables::features::{
    feature_file_path, write_feature_labels, write_review_stats,
};
use storelens_storage::tables::reviews::{read_reviews, read_reviews_optional};
use storelens_storage::tables::websites::read_websites_optional;

use super::{load_library, parent_dir};

/// `--feature` value that runs the whole library.
pub const ALL_FEATURES: &str = "all";

#[derive(Debug, Args)]
pub struct FlagsArgs {
    /// Cleaned app table.
    #[arg(long)]
    pub apps: PathBuf,

    /// Website text table.
    #[arg(long)]
    pub web: Option<PathBuf>,

    /// Review table used for corroboration.
    #[arg(long)]
    pub reviews: Option<PathBuf>,

    /// Feature name, or `all`.
    #[arg(long, default_value = ALL_FEATURES)]
    pub feature: String,

    /// Output for a single feature. Default: `features_<name>.csv` in `--out-dir`.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Output directory. Default: the directory of `--apps`.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Pattern TOML replacing the built-in library.
    #[arg(long)]
    pub patterns: Option<String>,
}

/// Website texts keyed by app, empty when the table is absent.
pub(crate) fn load_websites(path: Option<&Path>) -> Result<FxHashMap<AppKey, String>, PipelineError> {
    match path {
        Some(p) => Ok(read_websites_optional(p)?.unwrap_or_default()),
        None => Ok(FxHashMap::default()),
    }
}

fn load_reviews(path: Option<&Path>) -> Result<Vec<ReviewRecord>, PipelineError> {
    match path {
        Some(p) => Ok(read_reviews_optional(p)?.unwrap_or_default()),
        None => Ok(Vec::new()),
    }
}

fn summary(run: &FlagRun, path: &Path) -> String {
    format!(
        "[features] {}: {}/{} apps flagged -> {}",
        run.feature,
        run.flagged(),
        run.total_apps,
        path.display()
    )
}

pub fn run(args: &FlagsArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    let library = load_library(config)?;
    let apps = read_apps(&args.apps)?;
    let websites = load_websites(args.web.as_deref())?;
    let corpus = ReviewCorpus::from_reviews(&load_reviews(args.reviews.as_deref())?);
    let driver = FeatureFlagDriver::new(
        &library,
        ConfidenceScorer::new(ScoringPolicy::from_config(&config.scoring)),
    );
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| parent_dir(&args.apps));

    if args.feature == ALL_FEATURES {
        let mut lines = Vec::new();
        for run in driver.run_all(&apps, &websites, &corpus) {
            let path = feature_file_path(&out_dir, &run.feature);
            write_feature_labels(&path, &run)?;
            lines.push(summary(&run, &path));
        }
        return Ok(lines.join("\n"));
    }

    let run = driver.run_feature(&args.feature, &apps, &websites, &corpus)?;
    let path = args
        .out
        .clone()
        .unwrap_or_else(|| feature_file_path(&out_dir, &run.feature));
    write_feature_labels(&path, &run)?;
    Ok(summary(&run, &path))
}

#[derive(Debug, Args)]
pub struct ReviewStatsArgs {
    #[arg(long)]
    pub reviews: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    /// Pattern TOML replacing the built-in library.
    #[arg(long)]
    pub patterns: Option<String>,
}

pub fn review_stats(args: &ReviewStatsArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    let library = load_library(config)?;
    let reviews = read_reviews(&args.reviews)?;
    let stats = feature_review_stats(&library, &reviews);
    write_review_stats(&args.out, &stats)?;
    Ok(format!(
        "[review-stats] {} (app, feature) pairs from {} reviews -> {}",
        stats.len(),
        reviews.len(),
        args.out.display()
    ))
}
