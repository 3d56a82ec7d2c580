//! Diagnostic logging to stderr; stdout stays reserved for command output

use tracing_subscriber::EnvFilter;

/// Filter variable, e.g. `BEACON_LOG=debug`
pub const LOG_ENV: &str = "BEACON_LOG";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
