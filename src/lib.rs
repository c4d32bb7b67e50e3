//! gitexpect - Git project type with PTY-driven remote command execution
//!
//! Runs git operations that may talk to a remote host over ssh. Such commands
//! only prompt when attached to a terminal, so each one runs on its own PTY
//! and its output is watched for a small set of known prompts.
//!
//! ## Module Organization
//!
//! - [`pty`] - PTY sessions, prompt patterns, bounded prompt waits
//! - [`remote`] - Remote command executor, host key policy, remote targets
//! - [`project`] - The Git project type (timing paths, fetch, project commands)
//! - [`execution`] - Local shell command runner
//! - [`config`] - Configuration loading and the shared [`ConfigStore`]
//! - [`logging`] - `tracing` subscriber setup
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use gitexpect::{init, Git};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = init()?;
//! let git = Git::new("ssh://scm.example.com/team/repo", "origin", "main", store);
//!
//! let output = git.execute_git_remote_command(["ls-remote", "origin"])?;
//! println!("{}", output);
//! println!("timings: {}", git.timing_file_path("unit").display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Host keys
//!
//! With `git.strict_host_key_checking = false` (the default) an unknown host
//! key is accepted by answering "yes" once. With it set to `true` the command
//! fails with [`Error::UntrustedHostKey`]. Username and password prompts always
//! fail with [`Error::CredentialsRequired`]; no credentials are ever sent.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod project;
pub mod pty;
pub mod remote;

pub use config::{Config, ConfigLoader, ConfigStore};
pub use error::{Error, Result};
pub use execution::{CommandOutput, CommandRunner, ShellRunner};
pub use project::Git;
pub use pty::{InteractiveSession, PromptKind, PtyDriver, SessionDriver, SpawnRequest, WaitOutcome};
pub use remote::{HostKeyPolicy, RemoteCommandExecutor, RemoteTarget};

/// The current version of gitexpect from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Load configuration from the default locations, install logging, and
/// return the shared store.
///
/// A missing or unreadable configuration falls back to defaults.
pub fn init() -> Result<ConfigStore> {
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: failed to load configuration, using defaults: {}", NAME, e);
            Config::default()
        }
    };
    start(config)
}

/// Like [`init`], but from an explicit configuration file. Load errors are
/// returned instead of falling back.
pub fn init_with_config(config_path: &std::path::Path) -> Result<ConfigStore> {
    let config = ConfigLoader::load_from_path(config_path)?;
    start(config)
}

fn start(config: Config) -> Result<ConfigStore> {
    if let Err(e) = logging::init_logging(&config.logging.level) {
        // Embedders may have installed their own subscriber
        debug!("{}", e);
    }
    info!("{} v{} starting, base directory {}", NAME, VERSION, config.base_directory.display());
    Ok(ConfigStore::new(config))
}
