//! Configuration management for gitexpect
//!
//! Holds the settings the Git project type reads at call time: where working
//! copies and timing files live, the host key policy, and PTY parameters.

pub mod loader;
pub mod store;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::remote::HostKeyPolicy;

pub use loader::{ConfigFormat, ConfigLoader, LoadOptions};
pub use store::ConfigStore;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root for repositories, timing files and other per-host state
    pub base_directory: PathBuf,

    /// Git project type configuration
    pub git: GitConfig,

    /// PTY configuration
    pub pty: PtyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            git: GitConfig::default(),
            pty: PtyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Host key policy derived from `git.strict_host_key_checking`
    pub fn host_key_policy(&self) -> HostKeyPolicy {
        HostKeyPolicy::from_strict_flag(self.git.strict_host_key_checking)
    }
}

/// Git-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Reject unknown host keys instead of accepting them
    pub strict_host_key_checking: bool,

    /// How long to wait for an ssh/git prompt before assuming none is coming
    pub prompt_timeout_secs: u64,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            strict_host_key_checking: false,
            prompt_timeout_secs: 10,
        }
    }
}

/// PTY-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PtyConfig {
    pub rows: u16,
    pub cols: u16,
    /// Whether to inherit parent environment
    pub inherit_env: bool,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            inherit_env: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `GITEXPECT_LOG` is unset (e.g. "info", "gitexpect=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_base_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".gitexpect"))
        .unwrap_or_else(|| PathBuf::from(".gitexpect"))
}
