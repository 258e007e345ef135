//! Logging setup for CLI output

use tracing_subscriber::EnvFilter;
use treecov_common::Verbosity;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity flags. Diagnostics go to
/// stderr so stdout stays clean for JSON and emitted source.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
