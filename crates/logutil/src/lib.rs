//! Utilities for logging.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging for tests. Output is captured by the test harness.
///
/// `RUST_LOG` takes precedence over the default debug level.
pub fn init_test() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::DEBUG.into())
        .from_env_lossy();

    // Ignore errors from setting the global subscriber twice.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .with_file(true)
        .with_line_number(true)
        .try_init();
}
