//! `agreement`.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{ArgGroup, Args};

use storelens_analysis::agreement::{agreement, RaterLabel, RaterTable};
use storelens_analysis::llm::rater_labels;
use storelens_core::config::StorelensConfig;
use storelens_core::constants::HEURISTIC_RATER;
use storelens_core::errors::PipelineError;
use storelens_core::types::AppKey;
use storelens_storage::tables::apps::read_apps;
use storelens_storage::tables::features::read_long;
use storelens_storage::tables::labels::{read_human_labels, read_rater_labels, write_agreement};
use storelens_storage::tables::llm::read_llm_responses;

use super::load_library;

/// At least one rater source is required; sources are merged.
#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("raters")
        .required(true)
        .multiple(true)
        .args(["input", "llm", "long"])
))]
pub struct AgreementArgs {
    /// Long rater table `(app_key, feature, rater, present)`.
    #[arg(long = "in")]
    pub input: Option<PathBuf>,

    /// Labeler response tables; each model is one rater.
    #[arg(long, num_args = 1..)]
    pub llm: Vec<PathBuf>,

    /// `features_long.csv`, rated as `heuristic`. Apps and features it
    /// does not list count as absent.
    #[arg(long)]
    pub long: Option<PathBuf>,

    /// App table the heuristic ran over. Default: every app any rater labeled.
    #[arg(long, requires = "long")]
    pub apps: Option<PathBuf>,

    /// Pattern TOML whose features the heuristic rated.
    #[arg(long)]
    pub patterns: Option<String>,

    /// Human labels `(app_key, feature, present)`.
    #[arg(long)]
    pub human: Option<PathBuf>,

    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &AgreementArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    let mut table = RaterTable::default();
    if let Some(path) = &args.input {
        table.extend(read_rater_labels(path)?);
    }
    for path in &args.llm {
        table.extend(rater_labels(&read_llm_responses(path)?));
    }
    if let Some(path) = &args.human {
        table.add_human(read_human_labels(path)?);
    }
    if let Some(path) = &args.long {
        let rows = read_long(path)?;
        let apps: BTreeSet<AppKey> = match &args.apps {
            Some(apps) => read_apps(apps)?.into_iter().map(|a| a.app_key).collect(),
            None => table
                .app_keys()
                .into_iter()
                .chain(rows.iter().map(|r| r.app_key.clone()))
                .collect(),
        };
        table.extend(rows.iter().map(RaterLabel::from));
        let features: BTreeSet<String> = load_library(config)?
            .names()
            .map(str::to_string)
            .chain(table.features_of(HEURISTIC_RATER))
            .collect();
        let filled = table.fill_absent(HEURISTIC_RATER, &apps, &features);
        tracing::debug!(apps = apps.len(), features = features.len(), filled, "heuristic absences filled");
    }

    let raters = table.rater_count();
    if raters < 2 {
        tracing::warn!(raters, "fewer than two raters, no pairs to compare");
    }
    let pairs = agreement(&table);
    write_agreement(&args.out, &pairs)?;
    Ok(format!(
        "[agreement] {} rater pairs from {raters} raters -> {}",
        pairs.len(),
        args.out.display()
    ))
}
