//! `matrix`.

use std::path::{Path, PathBuf};

use clap::Args;

use storelens_analysis::matrix::{assemble_long, build_bundle, MatrixSet};
use storelens_analysis::sentiment::collapse_by_app;
use storelens_core::config::{SentimentWeighting, StorelensConfig};
use storelens_core::constants::FEATURES_BUNDLE_FILE;
use storelens_core::errors::PipelineError;
use storelens_storage::tables::apps::read_apps_optional;
use storelens_storage::tables::features::{
    discover_feature_files, long_path, read_feature_file, write_bundle, write_long,
    write_matrices,
};
use storelens_storage::tables::sentiment::read_sentiment_optional;

use super::parse_weighting;

/// App tables tried in order when `--apps-csv` is not given.
const APP_TABLE_FALLBACKS: [&str; 2] = ["apps_clean.csv", "apps_all.csv"];
const SENTIMENT_FALLBACK: &str = "app_sentiment.csv";

#[derive(Debug, Args)]
pub struct MatrixArgs {
    /// Directory holding `features_<name>.csv` label files.
    #[arg(long)]
    pub in_dir: PathBuf,

    /// Default: `--in-dir`.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Confidence floor for label rows without an explicit flag.
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Review-hit floor for label rows without an explicit flag.
    #[arg(long)]
    pub min_review_hits: Option<u32>,

    /// Join app metadata into the bundle.
    #[arg(long)]
    pub bundle_apps: bool,

    #[arg(long)]
    pub apps_csv: Option<PathBuf>,

    /// Join per-app sentiment into the bundle.
    #[arg(long)]
    pub bundle_sent: bool,

    #[arg(long)]
    pub sent_csv: Option<PathBuf>,

    /// `weighted` or `unweighted` country collapse.
    #[arg(long, value_parser = parse_weighting)]
    pub sentiment_weighting: Option<SentimentWeighting>,
}

fn apps_table(args: &MatrixArgs) -> PathBuf {
    if let Some(p) = &args.apps_csv {
        return p.clone();
    }
    APP_TABLE_FALLBACKS
        .iter()
        .map(|name| args.in_dir.join(name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| args.in_dir.join(APP_TABLE_FALLBACKS[0]))
}

pub fn run(args: &MatrixArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    let out_dir: &Path = args.out_dir.as_deref().unwrap_or(&args.in_dir);

    let files = discover_feature_files(&args.in_dir)?
        .iter()
        .map(|(feature, path)| read_feature_file(path, feature))
        .collect::<Result<Vec<_>, _>>()?;
    let long = assemble_long(
        &files,
        config.matrix.effective_min_confidence(),
        u64::from(config.matrix.effective_min_review_hits()),
    );
    let set = MatrixSet::pivot(&long);
    write_matrices(out_dir, &set)?;
    write_long(&long_path(out_dir), &long)?;

    let apps = if args.bundle_apps {
        read_apps_optional(&apps_table(args))?
    } else {
        None
    };
    let sentiment = if args.bundle_sent {
        let path = args
            .sent_csv
            .clone()
            .unwrap_or_else(|| args.in_dir.join(SENTIMENT_FALLBACK));
        read_sentiment_optional(&path)?
            .map(|rows| collapse_by_app(&rows, config.matrix.effective_sentiment_weighting()))
    } else {
        None
    };
    let bundle = build_bundle(&long, apps.as_deref(), sentiment.as_deref());
    write_bundle(&out_dir.join(FEATURES_BUNDLE_FILE), &bundle)?;

    Ok(format!(
        "[matrix] {} features x {} apps, {} long rows -> {}",
        set.flags.features().len(),
        set.flags.app_count(),
        long.len(),
        out_dir.display()
    ))
}
