//! Diagnostic tracing for the walker.
//!
//! Output goes to stderr in compact format and is filtered by `RUST_LOG`.
//! Walk results that matter after the process exits live in
//! `.waywalk/inSpot.json`, not in the log.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `waywalk=info` so step progress is visible.
///
/// # Example
/// ```bash
/// RUST_LOG=waywalk=debug waywalk run
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waywalk=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
