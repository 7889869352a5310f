//! Diagnostic logging via `tracing`
//!
//! Logs go to stderr so stdout stays clean for the download link. The level
//! comes from `RUST_LOG` (default `warn`); `--verbose` raises it to `debug`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "voice_recorder=debug,info";

/// Install the global subscriber. Safe to call once per process; later calls
/// are ignored.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init();
}
