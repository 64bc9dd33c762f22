//! `classify`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use storelens_analysis::llm::{ClassificationRunner, RunnerOptions};
use storelens_core::config::{LlmConfig, PromptStyle, StorelensConfig};
use storelens_core::errors::PipelineError;
use storelens_core::types::FxHashSet;
use storelens_storage::tables::apps::read_apps;
use storelens_storage::tables::llm::{append_llm_responses, read_done_keys, write_llm_responses};

use super::flags::load_websites;
use super::{load_library, parse_prompt};
use crate::classifier::CommandClassifier;

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Cleaned app table.
    #[arg(long)]
    pub apps: PathBuf,

    /// Website text table.
    #[arg(long)]
    pub web: Option<PathBuf>,

    /// Response table to write, or to extend with `--resume`.
    #[arg(long)]
    pub out: PathBuf,

    /// Vendor name; vendors with a known key variable are skipped when it is unset.
    #[arg(long)]
    pub vendor: String,

    #[arg(long)]
    pub model: String,

    /// Taxonomy offered to the model. Default: every library feature.
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Pattern TOML supplying the default taxonomy.
    #[arg(long)]
    pub patterns: Option<String>,

    #[arg(long)]
    pub max_attempts: Option<u32>,

    #[arg(long)]
    pub sleep_ms: Option<u64>,

    /// Per-call time budget; a child running over is killed.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// `goldilocks` (features with support labels) or `presence`
    /// (a flag per taxonomy feature, for `agreement --llm`).
    #[arg(long, value_parser = parse_prompt)]
    pub prompt: Option<PromptStyle>,

    /// Skip app_keys already present in `--out`.
    #[arg(long)]
    pub resume: bool,

    /// Program reading the prompt on stdin and printing the response.
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

pub fn run(args: &ClassifyArgs, config: &StorelensConfig) -> Result<String, PipelineError> {
    if !LlmConfig::key_vars(&args.vendor).is_empty() && LlmConfig::api_key(&args.vendor).is_none() {
        tracing::info!(
            vendor = %args.vendor,
            vars = ?LlmConfig::key_vars(&args.vendor),
            "no API key set, vendor skipped"
        );
        return Ok(format!("[classify] {}: skipped, no API key", args.vendor));
    }

    let taxonomy: Vec<String> = if args.features.is_empty() {
        load_library(config)?.names().map(str::to_string).collect()
    } else {
        args.features.clone()
    };
    let apps = read_apps(&args.apps)?;
    let websites = load_websites(args.web.as_deref())?;

    let options = RunnerOptions::from_config(&config.llm);
    let done = if options.resume {
        read_done_keys(&args.out)?
    } else {
        FxHashSet::default()
    };

    let (program, program_args) = match args.command.split_first() {
        Some((p, rest)) => (p.clone(), rest.to_vec()),
        None => (String::new(), Vec::new()),
    };
    let classifier = CommandClassifier::new(&args.vendor, &args.model, program, program_args)
        .with_timeout(Duration::from_millis(config.llm.effective_timeout_ms()));
    let result = ClassificationRunner::new(&classifier, options).run(&apps, &websites, &taxonomy, &done);

    let written = if options.resume {
        append_llm_responses(&args.out, &result.data)?
    } else {
        write_llm_responses(&args.out, &result.data)?
    };
    Ok(format!(
        "[classify] {}/{}: {written} responses, {} failed, {} already done -> {}",
        args.vendor,
        args.model,
        result.error_count(),
        done.len(),
        args.out.display()
    ))
}
