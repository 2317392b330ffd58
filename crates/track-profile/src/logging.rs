//! Logging setup for the command line tool.
//!
//! `RUST_LOG` is respected when set. Otherwise debug builds log at `debug` and
//! release builds at `info`. Output goes to stderr so artifacts written to stdout
//! stay clean.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_DEBUG_FILTER: &str = "debug";
const DEFAULT_RELEASE_FILTER: &str = "info";

/// Install the global fmt subscriber. Calling it twice only logs a warning.
pub fn setup_logging() {
    let default_filter = if cfg!(debug_assertions) {
        DEFAULT_DEBUG_FILTER
    } else {
        DEFAULT_RELEASE_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        tracing::warn!("Logging was already initialized; keeping the existing subscriber");
    } else {
        tracing::debug!("Logging initialized (default filter: {default_filter})");
    }
}
