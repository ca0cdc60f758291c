//! Minimal logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

/// Initialize a plain-text tracing subscriber.
///
/// Respects `RUST_LOG`; falls back to `default_level` (e.g. `"info"`) when it is
/// unset. Calling this twice is harmless: the second call is ignored.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
