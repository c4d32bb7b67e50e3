//! PTY Session
//!
//! One spawned interactive process driven through its PTY: prompt waits with
//! a deadline, line input, completion and exit status.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use portable_pty::{Child, ChildKiller, MasterPty};
use uuid::Uuid;

use super::patterns::{PromptSet, WaitOutcome};
use super::streams::{PtyStreams, StreamRead};
use super::InteractiveSession;
use crate::error::{Error, Result};

/// A process attached to a PTY for the duration of one remote command
pub struct PtySession {
    id: Uuid,
    command: String,
    child: Box<dyn Child + Send + Sync>,
    // Dropping the master hangs up the child, so it lives as long as the session.
    _master: Box<dyn MasterPty + Send>,
    streams: PtyStreams,
    /// Everything the process printed so far
    buffer: Vec<u8>,
    /// Start of the output not yet consumed by a prompt match
    cursor: usize,
    eof: bool,
    exit_code: Option<i32>,
    completed: bool,
    started_at: DateTime<Utc>,
}

impl PtySession {
    pub(crate) fn new(
        id: Uuid,
        command: String,
        child: Box<dyn Child + Send + Sync>,
        master: Box<dyn MasterPty + Send>,
        streams: PtyStreams,
    ) -> Self {
        Self {
            id,
            command,
            child,
            _master: master,
            streams,
            buffer: Vec::new(),
            cursor: 0,
            eof: false,
            exit_code: None,
            completed: false,
            started_at: Utc::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    fn reap(&mut self) -> Result<i32> {
        if let Some(code) = self.exit_code {
            return Ok(code);
        }
        let status = self.child.wait()?;
        let code = status.exit_code() as i32;
        self.exit_code = Some(code);
        Ok(code)
    }

    fn has_exited(&mut self) -> bool {
        if self.eof || self.exit_code.is_some() {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exit_code = Some(status.exit_code() as i32);
                true
            }
            _ => false,
        }
    }
}

impl InteractiveSession for PtySession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn wait_for_any(&mut self, prompts: &PromptSet, timeout: Duration) -> Result<WaitOutcome> {
        // A timeout too large to add to `now` means no deadline at all.
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if let Some(found) = prompts.find_earliest(&self.buffer[self.cursor..]) {
                self.cursor += found.end;
                debug!(session = %self.id, prompt = %found.kind, "prompt matched");
                return Ok(WaitOutcome::Matched(found.kind));
            }

            if self.eof {
                return Ok(WaitOutcome::Exited);
            }

            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if remaining.is_zero() {
                trace!(session = %self.id, "no prompt within {:?}", timeout);
                return Ok(WaitOutcome::TimedOut);
            }

            match self.streams.read_with_timeout(remaining) {
                StreamRead::Data(bytes) => self.buffer.extend_from_slice(&bytes),
                StreamRead::Empty => {}
                StreamRead::Closed => self.eof = true,
            }
        }
    }

    fn send_line(&mut self, text: &str) -> Result<()> {
        if self.has_exited() {
            return Err(Error::SessionClosed {
                session_id: self.id.to_string(),
            });
        }
        self.streams.write_line(text).map_err(|e| {
            debug!(session = %self.id, "write to PTY failed: {}", e);
            Error::SessionClosed {
                session_id: self.id.to_string(),
            }
        })
    }

    fn wait_for_completion(&mut self) -> Result<()> {
        while !self.eof {
            match self.streams.read_blocking() {
                StreamRead::Data(bytes) => self.buffer.extend_from_slice(&bytes),
                StreamRead::Empty => {}
                StreamRead::Closed => self.eof = true,
            }
        }

        let code = self.reap()?;
        self.completed = true;
        debug!(
            session = %self.id,
            exit_code = code,
            elapsed = ?self.elapsed(),
            "'{}' completed",
            self.command
        );
        Ok(())
    }

    fn exit_status(&self) -> Result<i32> {
        match (self.completed, self.exit_code) {
            (true, Some(code)) => Ok(code),
            _ => Err(Error::SessionNotTerminated {
                session_id: self.id.to_string(),
            }),
        }
    }

    fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    fn terminate(&mut self) {
        if self.exit_code.is_some() {
            return;
        }
        if let Err(e) = self.child.kill() {
            // Already gone is fine; the wait below still reaps it.
            trace!(session = %self.id, "kill failed: {}", e);
        }
        match self.child.wait() {
            Ok(status) => self.exit_code = Some(status.exit_code() as i32),
            Err(e) => warn!(session = %self.id, "failed to reap '{}': {}", self.command, e),
        }
        debug!(session = %self.id, "terminated '{}'", self.command);
    }
}

impl Drop for PtySession {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for PtySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtySession")
            .field("id", &self.id)
            .field("command", &self.command)
            .field("eof", &self.eof)
            .field("exit_code", &self.exit_code)
            .field("started_at", &self.started_at)
            .finish()
    }
}
