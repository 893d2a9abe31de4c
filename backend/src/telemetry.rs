//! Tracing bootstrap shared by embedding binaries and integration tests.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the global JSON tracing subscriber.
///
/// Filtering follows `RUST_LOG`. Safe to call more than once: a second call
/// logs a warning instead of panicking, which keeps test binaries that share
/// a process happy.
pub fn init() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}
