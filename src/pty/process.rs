//! PTY Process Spawning
//!
//! Handles the creation and spawning of pseudoterminal processes
//! using the portable-pty crate for cross-platform compatibility.

use std::env;

use portable_pty::{native_pty_system, Child, ChildKiller, CommandBuilder, PtySize};
use uuid::Uuid;

use super::session::PtySession;
use super::streams::PtyStreams;
use super::{SessionDriver, SpawnRequest};
use crate::config::PtyConfig;
use crate::error::{Error, Result};

/// Process spawning configuration
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// Terminal size
    pub size: PtySize,
    /// Whether to inherit the parent environment
    pub inherit_env: bool,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            size: PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            },
            inherit_env: true,
        }
    }
}

impl From<&PtyConfig> for SpawnConfig {
    fn from(config: &PtyConfig) -> Self {
        Self {
            size: PtySize {
                rows: config.rows,
                cols: config.cols,
                pixel_width: 0,
                pixel_height: 0,
            },
            inherit_env: config.inherit_env,
        }
    }
}

/// Spawn `request` attached to a fresh PTY
pub fn spawn_pty_session(request: &SpawnRequest, config: &SpawnConfig) -> Result<PtySession> {
    let command_line = request.to_string();
    let pty_system = native_pty_system();

    let pair = pty_system
        .openpty(config.size)
        .map_err(|e| Error::PtyCreationFailed {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

    let mut cmd_builder = CommandBuilder::new(&request.program);
    cmd_builder.args(&request.args);

    if !config.inherit_env {
        cmd_builder.env_clear();
    }
    for (key, value) in &request.env {
        cmd_builder.env(key, value);
    }
    // portable-pty falls back to $HOME without an explicit cwd
    match &request.working_directory {
        Some(dir) => cmd_builder.cwd(dir),
        None => {
            if let Ok(cwd) = env::current_dir() {
                cmd_builder.cwd(cwd);
            }
        }
    }

    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| Error::PtyCreationFailed {
            command: command_line.clone(),
            reason: format!("failed to clone PTY reader: {}", e),
        })?;
    let writer = pair.master.take_writer().map_err(|e| Error::PtyCreationFailed {
        command: command_line.clone(),
        reason: format!("failed to take PTY writer: {}", e),
    })?;

    let mut child = pair
        .slave
        .spawn_command(cmd_builder)
        .map_err(|e| Error::SpawnFailed {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

    // Our copy of the slave must go, otherwise the master never sees EOF.
    drop(pair.slave);

    let id = Uuid::new_v4();
    let streams = match PtyStreams::spawn(format!("pty-reader-{}", id), reader, writer) {
        Ok(streams) => streams,
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::SpawnFailed {
                command: command_line,
                reason: format!("failed to start PTY reader: {}", e),
            });
        }
    };

    debug!(
        session = %id,
        pid = ?child.process_id(),
        "spawned '{}' on PTY",
        command_line
    );

    Ok(PtySession::new(id, command_line, child, pair.master, streams))
}

/// Production [`SessionDriver`] backed by a native PTY
#[derive(Debug, Clone, Default)]
pub struct PtyDriver {
    config: SpawnConfig,
}

impl PtyDriver {
    pub fn new(config: SpawnConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }
}

impl SessionDriver for PtyDriver {
    type Session = PtySession;

    fn spawn(&self, request: &SpawnRequest) -> Result<PtySession> {
        spawn_pty_session(request, &self.config)
    }
}
