//! `dedup-reviews`.

use std::path::PathBuf;

use clap::Args;

use storelens_analysis::reviews::{ReviewDeduper, SpecialDetector};
use storelens_core::config::{DedupeScope, StorelensConfig};
use storelens_core::errors::PipelineError;
use storelens_storage::tables::reviews::{read_reviews, write_reviews};

use super::parse_scope;

#[derive(Debug, Args)]
pub struct DedupReviewsArgs {
    /// Review tables, merged in the order given.
    #[arg(long = "in", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    #[arg(long)]
    pub out: PathBuf,

    /// `global` or `country`.
    #[arg(long, value_parser = parse_scope)]
    pub dedupe_scope: Option<DedupeScope>,
}

pub fn dedup(args: &DedupReviewsArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    let mut deduper = ReviewDeduper::new(config.reviews.effective_dedupe_scope());
    for path in &args.inputs {
        for review in read_reviews(path)? {
            deduper.push(review);
        }
    }
    let (mut reviews, stats) = deduper.finish();
    let special = SpecialDetector::builtin()?.tag(&mut reviews);
    write_reviews(&args.out, &reviews)?;

    tracing::info!(
        input = stats.input,
        duplicate_ids = stats.duplicate_ids,
        duplicate_texts = stats.duplicate_texts,
        replaced = stats.replaced,
        special,
        "reviews deduplicated"
    );
    Ok(format!(
        "[reviews] {} -> {} reviews ({} duplicate ids, {} duplicate texts, {special} special) -> {}",
        stats.input,
        stats.output,
        stats.duplicate_ids,
        stats.duplicate_texts,
        args.out.display()
    ))
}
