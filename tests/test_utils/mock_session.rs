//! Mock Session Driver for Testing
//!
//! Each spawn takes the next [`SessionScript`] and replays its prompt
//! outcomes. Everything the code under test does to a session is recorded in
//! a shared [`MockRecord`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gitexpect::error::{Error, Result};
use gitexpect::pty::{InteractiveSession, PromptKind, PromptSet, SessionDriver, SpawnRequest, WaitOutcome};
use uuid::Uuid;

/// What one spawned session will do
#[derive(Debug, Clone)]
pub struct SessionScript {
    /// Returned by successive `wait_for_any` calls; `TimedOut` once exhausted
    pub waits: Vec<WaitOutcome>,
    pub output: String,
    pub exit_code: i32,
}

impl SessionScript {
    /// No prompts, exits 0
    pub fn quiet(output: &str) -> Self {
        Self {
            waits: Vec::new(),
            output: output.to_string(),
            exit_code: 0,
        }
    }

    pub fn prompting(waits: Vec<WaitOutcome>) -> Self {
        Self {
            waits,
            output: String::new(),
            exit_code: 0,
        }
    }

    pub fn host_key_prompt() -> Self {
        Self::prompting(vec![WaitOutcome::Matched(PromptKind::HostKeyConfirmation)])
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.to_string();
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }
}

/// Observations shared by the driver and all its sessions
#[derive(Debug, Default)]
pub struct MockRecord {
    pub spawned: Vec<SpawnRequest>,
    pub sent: Vec<String>,
    pub wait_timeouts: Vec<Duration>,
    pub completions: usize,
    pub terminations: usize,
}

/// Scripted [`SessionDriver`]; clones share scripts and record
#[derive(Debug, Clone, Default)]
pub struct MockSessionDriver {
    scripts: Arc<Mutex<VecDeque<SessionScript>>>,
    record: Arc<Mutex<MockRecord>>,
    spawn_error: Arc<Mutex<Option<String>>>,
}

impl MockSessionDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripts(scripts: Vec<SessionScript>) -> Self {
        let driver = Self::new();
        driver.scripts.lock().unwrap().extend(scripts);
        driver
    }

    pub fn push_script(&self, script: SessionScript) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Make every following spawn fail
    pub fn fail_spawns(&self, reason: &str) {
        *self.spawn_error.lock().unwrap() = Some(reason.to_string());
    }

    pub fn sent(&self) -> Vec<String> {
        self.record.lock().unwrap().sent.clone()
    }

    pub fn spawned(&self) -> Vec<SpawnRequest> {
        self.record.lock().unwrap().spawned.clone()
    }

    pub fn wait_timeouts(&self) -> Vec<Duration> {
        self.record.lock().unwrap().wait_timeouts.clone()
    }

    pub fn completions(&self) -> usize {
        self.record.lock().unwrap().completions
    }

    pub fn terminations(&self) -> usize {
        self.record.lock().unwrap().terminations
    }
}

impl SessionDriver for MockSessionDriver {
    type Session = MockSession;

    fn spawn(&self, request: &SpawnRequest) -> Result<MockSession> {
        if let Some(reason) = self.spawn_error.lock().unwrap().clone() {
            return Err(Error::SpawnFailed {
                command: request.to_string(),
                reason,
            });
        }

        self.record.lock().unwrap().spawned.push(request.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| SessionScript::quiet(""));

        Ok(MockSession {
            id: Uuid::new_v4(),
            waits: script.waits.into(),
            output: script.output,
            exit_code: script.exit_code,
            completed: false,
            terminated: false,
            record: Arc::clone(&self.record),
        })
    }
}

pub struct MockSession {
    id: Uuid,
    waits: VecDeque<WaitOutcome>,
    output: String,
    exit_code: i32,
    completed: bool,
    terminated: bool,
    record: Arc<Mutex<MockRecord>>,
}

impl InteractiveSession for MockSession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn wait_for_any(&mut self, _prompts: &PromptSet, timeout: Duration) -> Result<WaitOutcome> {
        self.record.lock().unwrap().wait_timeouts.push(timeout);
        Ok(self.waits.pop_front().unwrap_or(WaitOutcome::TimedOut))
    }

    fn send_line(&mut self, text: &str) -> Result<()> {
        if self.completed || self.terminated {
            return Err(Error::SessionClosed {
                session_id: self.id.to_string(),
            });
        }
        self.record.lock().unwrap().sent.push(text.to_string());
        Ok(())
    }

    fn wait_for_completion(&mut self) -> Result<()> {
        self.completed = true;
        self.record.lock().unwrap().completions += 1;
        Ok(())
    }

    fn exit_status(&self) -> Result<i32> {
        if self.completed {
            Ok(self.exit_code)
        } else {
            Err(Error::SessionNotTerminated {
                session_id: self.id.to_string(),
            })
        }
    }

    fn output(&self) -> String {
        self.output.clone()
    }

    fn terminate(&mut self) {
        if !self.terminated {
            self.terminated = true;
            self.record.lock().unwrap().terminations += 1;
        }
    }
}
