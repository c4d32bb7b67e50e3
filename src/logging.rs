//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from `GITEXPECT_LOG` (any `EnvFilter` directive, e.g.
//! "debug" or "gitexpect::remote=trace"), falling back to the level given by
//! the caller. Logs go to stderr so command output on stdout stays clean.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

pub const LOG_ENV_VAR: &str = "GITEXPECT_LOG";

/// Build the filter from the environment or `default_level`
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to initialize logging: {}", e)))
}
