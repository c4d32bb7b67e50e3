//! Host key policy and prompt decisions

use serde::{Deserialize, Serialize};

use crate::pty::{PromptKind, WaitOutcome};

/// The only input ever sent to a remote command
pub const HOST_KEY_ACCEPT: &str = "yes";

/// What to do when a host presents a key that is not yet trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKeyPolicy {
    /// Fail the command
    Strict,
    /// Answer "yes" and continue
    Permissive,
}

impl HostKeyPolicy {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            HostKeyPolicy::Strict
        } else {
            HostKeyPolicy::Permissive
        }
    }
}

/// Next step after the initial prompt wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    /// No prompt; let the command run to completion
    AwaitCompletion,
    /// Send [`HOST_KEY_ACCEPT`] and continue
    AcceptHostKey,
    /// Abandon the command without sending anything
    RejectHostKey,
    /// Abandon the command; no credentials are available
    RejectCredentialPrompt(PromptKind),
}

/// Decide how to react to `outcome` under `policy`
pub fn decide(policy: HostKeyPolicy, outcome: WaitOutcome) -> PromptAction {
    match outcome {
        WaitOutcome::TimedOut | WaitOutcome::Exited => PromptAction::AwaitCompletion,
        WaitOutcome::Matched(PromptKind::HostKeyConfirmation) => match policy {
            HostKeyPolicy::Strict => PromptAction::RejectHostKey,
            HostKeyPolicy::Permissive => PromptAction::AcceptHostKey,
        },
        WaitOutcome::Matched(kind) => PromptAction::RejectCredentialPrompt(kind),
    }
}
