//! Pseudoterminal (PTY) Session Driver
//!
//! Runs programs that only prompt when attached to a terminal (ssh, git over
//! ssh) on a PTY, waits for known prompts with a bounded timeout and answers
//! them one line at a time.
//!
//! - [`SessionDriver`] spawns sessions; [`PtyDriver`] is the native one.
//! - [`InteractiveSession`] is the per-command handle; [`PtySession`]
//!   implements it over `portable-pty`.
//! - [`patterns`] holds the prompt signatures and [`WaitOutcome`].

pub mod patterns;
pub mod process;
pub mod session;
pub mod streams;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::Result;

// Re-exports for convenience
pub use patterns::{PromptKind, PromptMatch, PromptPattern, PromptSet, WaitOutcome};
pub use process::{spawn_pty_session, PtyDriver, SpawnConfig};
pub use session::PtySession;
pub use streams::{PtyStreams, StreamRead};

/// A command to launch on a PTY
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl SpawnRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_directory: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for SpawnRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// One spawned interactive process, driven by a single caller
pub trait InteractiveSession: Send {
    /// Unique id used to correlate log lines
    fn id(&self) -> Uuid;

    /// Block until unconsumed output matches one of `prompts`, the output
    /// ends, or `timeout` elapses. A timeout is an ordinary outcome.
    fn wait_for_any(&mut self, prompts: &PromptSet, timeout: Duration) -> Result<WaitOutcome>;

    /// Write `text` and a line terminator.
    ///
    /// # Errors
    /// [`Error::SessionClosed`](crate::Error::SessionClosed) once the process
    /// has terminated.
    fn send_line(&mut self, text: &str) -> Result<()>;

    /// Block until the output reaches end-of-stream and reap the process
    fn wait_for_completion(&mut self) -> Result<()>;

    /// Exit code of the reaped process.
    ///
    /// # Errors
    /// [`Error::SessionNotTerminated`](crate::Error::SessionNotTerminated)
    /// before [`wait_for_completion`](Self::wait_for_completion).
    fn exit_status(&self) -> Result<i32>;

    /// Everything captured so far
    fn output(&self) -> String;

    /// Kill and reap the process if it is still running. Idempotent.
    fn terminate(&mut self);
}

/// Spawns a fresh [`InteractiveSession`] per command
pub trait SessionDriver: Send + Sync {
    type Session: InteractiveSession;

    fn spawn(&self, request: &SpawnRequest) -> Result<Self::Session>;
}

impl<D: SessionDriver + ?Sized> SessionDriver for Arc<D> {
    type Session = D::Session;

    fn spawn(&self, request: &SpawnRequest) -> Result<Self::Session> {
        (**self).spawn(request)
    }
}
