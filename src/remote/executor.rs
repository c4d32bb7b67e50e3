//! Remote Command Executor
//!
//! Runs one command that may talk to a remote host over ssh, answering the
//! host key question according to a [`HostKeyPolicy`] and failing on any
//! credential prompt.

use std::time::Duration;

use super::policy::{decide, HostKeyPolicy, PromptAction, HOST_KEY_ACCEPT};
use super::target::RemoteTarget;
use crate::error::{Error, Result};
use crate::pty::{InteractiveSession, PromptKind, PromptSet, SessionDriver, SpawnRequest, WaitOutcome};

/// How long to wait for a prompt before assuming none is coming
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest prompt wait accepted; larger values are clamped to it
pub const MAX_PROMPT_TIMEOUT: Duration = Duration::from_secs(3600);

pub struct RemoteCommandExecutor<D: SessionDriver> {
    driver: D,
    prompt_timeout: Duration,
}

impl<D: SessionDriver> RemoteCommandExecutor<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            prompt_timeout: DEFAULT_PROMPT_TIMEOUT,
        }
    }

    pub fn with_prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = timeout.min(MAX_PROMPT_TIMEOUT);
        self
    }

    pub fn prompt_timeout(&self) -> Duration {
        self.prompt_timeout
    }

    /// Run `request` against `target` and return its captured output.
    ///
    /// The only input ever sent is a single "yes" to the host key question,
    /// and only under [`HostKeyPolicy::Permissive`]. The session is
    /// terminated before this returns, whatever the outcome.
    ///
    /// # Errors
    /// - [`Error::UntrustedHostKey`] when the host key is unknown and the
    ///   policy is strict
    /// - [`Error::HostKeyPromptRepeated`] when the question comes back after
    ///   it was answered
    /// - [`Error::CredentialsRequired`] on a username or password prompt
    /// - [`Error::RemoteCommandFailed`] on a non-zero exit
    pub fn execute_remote_command(
        &self,
        target: &RemoteTarget,
        request: &SpawnRequest,
        policy: HostKeyPolicy,
    ) -> Result<String> {
        let mut session = self.driver.spawn(request)?;
        let span = info_span!(
            "remote_command",
            session = %session.id(),
            target = %target.url(),
            ?policy
        );
        let _enter = span.enter();
        debug!("running '{}'", request);

        let result = self.drive(&mut session, target, request, policy);
        session.terminate();

        match &result {
            Ok(_) => info!("'{}' succeeded", request),
            Err(e) => warn!("'{}' failed: {}", request, e),
        }
        result
    }

    fn drive<S: InteractiveSession>(
        &self,
        session: &mut S,
        target: &RemoteTarget,
        request: &SpawnRequest,
        policy: HostKeyPolicy,
    ) -> Result<String> {
        let prompts = PromptSet::remote_prompts();
        let outcome = session.wait_for_any(prompts, self.prompt_timeout)?;

        match decide(policy, outcome) {
            PromptAction::AwaitCompletion => {}
            PromptAction::RejectHostKey => {
                return Err(Error::UntrustedHostKey {
                    target: target.url().to_string(),
                });
            }
            PromptAction::RejectCredentialPrompt(prompt) => {
                return Err(credentials_required(target, prompt));
            }
            PromptAction::AcceptHostKey => {
                info!("accepting host key for {}", target.url());
                session.send_line(HOST_KEY_ACCEPT)?;

                match session.wait_for_any(prompts, self.prompt_timeout)? {
                    WaitOutcome::Matched(PromptKind::HostKeyConfirmation) => {
                        return Err(Error::HostKeyPromptRepeated {
                            target: target.url().to_string(),
                        });
                    }
                    WaitOutcome::Matched(prompt) => {
                        return Err(credentials_required(target, prompt));
                    }
                    WaitOutcome::TimedOut | WaitOutcome::Exited => {}
                }
            }
        }

        session.wait_for_completion()?;
        let exit_code = session.exit_status()?;
        let output = session.output();

        if exit_code == 0 {
            Ok(output)
        } else {
            Err(Error::RemoteCommandFailed {
                command: request.to_string(),
                exit_code,
                output,
            })
        }
    }
}

fn credentials_required(target: &RemoteTarget, prompt: PromptKind) -> Error {
    Error::CredentialsRequired {
        target: target.url().to_string(),
        prompt,
    }
}
