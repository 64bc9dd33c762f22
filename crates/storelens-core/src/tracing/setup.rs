//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "STORELENS_LOG";

/// Initialize the storelens tracing/logging system.
///
/// Reads `STORELENS_LOG` for per-crate log levels.
/// Format: `STORELENS_LOG=storelens_analysis=debug,storelens_storage=warn`
///
/// Falls back to `storelens=info` if `STORELENS_LOG` is not set or is invalid.
/// Logs go to stderr so stage summaries on stdout stay clean.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("storelens=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(filter)
            .init();
    });
}
