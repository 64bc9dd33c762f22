//! `normalize` and `clean`.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use storelens_analysis::apps::{
    clean_apps, normalize_records, CleaningPolicy, RelevanceScorer, RelevanceTerms,
};
use storelens_core::config::StorelensConfig;
use storelens_core::errors::PipelineError;
use storelens_storage::raw::read_raw_dump;
use storelens_storage::tables::apps::{read_apps, write_apps, write_dropped};

use super::parent_dir;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Raw dump: `.jsonl`, `.json` or `.csv`.
    #[arg(long = "in")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    /// Extra relevance include terms, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub include_terms: Vec<String>,

    /// Extra relevance exclude terms, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub exclude_terms: Vec<String>,
}

pub fn normalize(args: &NormalizeArgs) -> Result<String, PipelineError> {
    let dump = read_raw_dump(&args.input)?;
    for e in &dump.errors {
        tracing::warn!(error = %e, "raw record skipped");
    }
    let terms = RelevanceTerms::default().with_extra(&args.include_terms, &args.exclude_terms);
    let scorer = RelevanceScorer::new(&terms)?;
    let apps = normalize_records(&dump.data, &scorer, Utc::now().date_naive());
    let written = write_apps(&args.out, &apps)?;

    Ok(format!(
        "[normalize] {written} apps ({} malformed skipped) -> {}",
        dump.error_count(),
        args.out.display()
    ))
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Normalized app table.
    #[arg(long = "in")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    /// Dropped rows with their reasons. Default: `apps_dropped.csv` next to `--out`.
    #[arg(long)]
    pub out_dropped: Option<PathBuf>,

    #[arg(long)]
    pub min_rating_count: Option<u64>,

    #[arg(long)]
    pub min_play_installs: Option<u64>,

    #[arg(long)]
    pub min_cws_users: Option<u64>,

    #[arg(long)]
    pub min_relevance: Option<f64>,
}

pub fn clean(args: &CleanArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    let apps = read_apps(&args.input)?;
    let outcome = clean_apps(apps, &CleaningPolicy::from_config(&config.cleaning));

    let dropped_path = args
        .out_dropped
        .clone()
        .unwrap_or_else(|| parent_dir(&args.out).join("apps_dropped.csv"));
    let kept = write_apps(&args.out, &outcome.kept)?;
    let dropped = write_dropped(&dropped_path, &outcome.dropped)?;

    Ok(format!(
        "[clean] kept {kept}, dropped {dropped} -> {} ({})",
        args.out.display(),
        dropped_path.display()
    ))
}
