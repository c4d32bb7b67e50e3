//! Local command execution
//!
//! Runs shell command lines without a PTY. Used for work inside a checked-out
//! project where no prompt can appear.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{Error, Result};

/// Combined output and exit code of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr
    pub output: String,
    /// -1 when the process was killed by a signal
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a shell command line
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `cwd` as the working directory when given,
    /// otherwise in the caller's current directory.
    async fn run(
        &self,
        command: &str,
        cwd: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> Result<CommandOutput>;
}

/// [`CommandRunner`] over `sh -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Give up on commands that run longer than `limit`
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        cwd: Option<&Path>,
        env: &HashMap<String, String>,
    ) -> Result<CommandOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .envs(env)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!("running '{}' in {:?}", command, cwd);

        let output = match self.timeout {
            Some(limit) => timeout(limit, cmd.output())
                .await
                .map_err(|_| Error::Other(format!("Command '{}' timed out after {:?}", command, limit)))?,
            None => cmd.output().await,
        }
        .map_err(|e| Error::Other(format!("Failed to execute command '{}': {}", command, e)))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let exit_code = output.status.code().unwrap_or(-1);

        trace!("'{}' exited with {}", command, exit_code);
        Ok(CommandOutput {
            output: combined,
            exit_code,
        })
    }
}
