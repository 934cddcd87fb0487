//! Tracing/logging initialization.
//!
//! Output is JSON, filtered through `RUST_LOG`. Only the first successful
//! call installs a subscriber; later calls are no-ops.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Like [`init`], falling back to `directives` when `RUST_LOG` is unset or invalid.
pub fn init_with_filter(directives: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Human-readable output captured by the test harness.
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
