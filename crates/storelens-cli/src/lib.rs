//! storelens command-line driver.
//!
//! Each subcommand reads its inputs through `storelens-storage`, runs one
//! `storelens-analysis` stage, writes its outputs and returns a one-line
//! summary for stdout. Fatal errors surface as [`PipelineError`] and are
//! printed as `[CODE] message` by the binary.

pub mod classifier;
pub mod commands;

use std::path::{Path, PathBuf};

use clap::Parser;

use storelens_core::config::StorelensConfig;
use storelens_core::errors::PipelineError;

pub use commands::Command;

#[derive(Debug, Parser)]
#[command(
    name = "storelens",
    version,
    about = "App-store feature detection, agreement and sentiment pipeline"
)]
pub struct Cli {
    /// Config file replacing `storelens.toml` in the working directory.
    #[arg(long, global = true, env = "STORELENS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Resolve configuration with the command's flag overrides, then run it.
pub fn run(cli: &Cli) -> Result<String, PipelineError> {
    let overrides = cli.command.overrides();
    let config =
        StorelensConfig::load_with_file(Path::new("."), cli.config.as_deref(), Some(&overrides))?;
    cli.command.run(&config)
}
