//! Logger setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Initialize the logger with appropriate settings.
///
/// Logs go to stderr so stdout stays free for command output (the
/// `check_superuser` token, `render`). `RUST_LOG` overrides `default_level`.
pub fn init_logger(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // try_init: a second call (e.g. from tests) is not an error worth reporting
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
