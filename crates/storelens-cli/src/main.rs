use std::process::ExitCode;

use clap::Parser;

use storelens_cli::Cli;
use storelens_core::errors::StorelensErrorCode;

fn main() -> ExitCode {
    storelens_core::tracing::init_tracing();
    let cli = Cli::parse();

    match storelens_cli::run(&cli) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = e.error_code(), "stage failed");
            eprintln!("{}", e.diagnostic());
            ExitCode::FAILURE
        }
    }
}
