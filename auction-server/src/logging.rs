//! Tracing subscriber setup for binaries and integration tests

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// Honors `RUST_LOG`; repeated calls are ignored so tests can call this
/// freely.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
