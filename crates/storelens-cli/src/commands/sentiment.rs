//! `sentiment`.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;

use storelens_analysis::sentiment::{aggregate, score_reviews, LexiconEngine, SentimentFilter};
use storelens_core::config::StorelensConfig;
use storelens_core::errors::PipelineError;
use storelens_storage::tables::reviews::{read_reviews, write_scored_reviews};
use storelens_storage::tables::sentiment::write_sentiment;

#[derive(Debug, Args)]
pub struct SentimentArgs {
    /// Deduplicated review table.
    #[arg(long = "in")]
    pub input: PathBuf,

    #[arg(long)]
    pub out_reviews: PathBuf,

    #[arg(long)]
    pub out_apps: PathBuf,

    /// Keep reviews from the last N days.
    #[arg(long)]
    pub since_days: Option<u32>,

    #[arg(long)]
    pub min_words: Option<usize>,

    #[arg(long)]
    pub min_chars: Option<usize>,

    /// Score only reviews tagged special.
    #[arg(long)]
    pub special_only: bool,

    /// Leave neutral reviews out of the aggregates.
    #[arg(long)]
    pub drop_neutrals: bool,
}

pub fn run(args: &SentimentArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    let reviews = read_reviews(&args.input)?;
    let input = reviews.len();

    let engine = LexiconEngine::from_config(&config.sentiment);
    let filter = SentimentFilter::from_config(&config.sentiment, Utc::now());
    let scored = score_reviews(reviews, &filter, &engine);
    if scored.is_empty() {
        tracing::info!(input, "no reviews left after filters");
    }
    write_scored_reviews(&args.out_reviews, &scored)?;

    let rows = aggregate(&scored, config.sentiment.effective_drop_neutrals_for_agg());
    write_sentiment(&args.out_apps, &rows)?;

    Ok(format!(
        "[sentiment] scored {}/{input} reviews, {} aggregate rows -> {}",
        scored.len(),
        rows.len(),
        args.out_apps.display()
    ))
}
