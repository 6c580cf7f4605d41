//! Tracing setup for the CLI.
//!
//! Logs go to stderr so that `cdnfs get` can stream object bytes on stdout.
//! `RUST_LOG` overrides the defaults below.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

const DEFAULT_DIRECTIVES: &str = "info,cdnfs_storage=info";

/// Install the global subscriber.
///
/// `verbose` raises every target to debug; `timing` logs a line with the
/// elapsed time whenever an instrumented span closes.
pub fn init_tracing(verbose: bool, timing: bool) {
    let filter = if verbose {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::DEBUG.into())
            .from_env_lossy()
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
    };

    let span_events = if timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_span_events(span_events)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
