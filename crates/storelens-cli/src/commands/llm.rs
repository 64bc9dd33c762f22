//! `flatten-llm`.

use std::path::PathBuf;

use clap::Args;

use storelens_analysis::llm::{flatten_responses, rater_labels};
use storelens_core::errors::PipelineError;
use storelens_storage::tables::labels::write_rater_labels;
use storelens_storage::tables::llm::{read_llm_responses, write_flat_features};

#[derive(Debug, Args)]
pub struct FlattenLlmArgs {
    /// Labeler response table.
    #[arg(long = "in")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    /// Also write presence judgments as a rater table.
    #[arg(long)]
    pub out_raters: Option<PathBuf>,
}

pub fn flatten(args: &FlattenLlmArgs) -> Result<String, PipelineError> {
    let responses = read_llm_responses(&args.input)?;
    let flat = flatten_responses(&responses);
    for e in &flat.errors {
        tracing::warn!(error = %e, "labeler response not parsed");
    }
    let written = write_flat_features(&args.out, &flat.data)?;

    let mut line = format!(
        "[llm] {} responses -> {written} feature rows ({} unparsed) -> {}",
        responses.len(),
        flat.error_count(),
        args.out.display()
    );
    if let Some(path) = &args.out_raters {
        let labels = rater_labels(&responses);
        write_rater_labels(path, &labels)?;
        line.push_str(&format!(", {} rater rows -> {}", labels.len(), path.display()));
    }
    Ok(line)
}
