//! Remote command execution
//!
//! Drives ssh-backed commands through a PTY session and applies the host key
//! policy to whatever the remote end asks.

pub mod executor;
pub mod policy;
pub mod target;

pub use executor::{RemoteCommandExecutor, DEFAULT_PROMPT_TIMEOUT, MAX_PROMPT_TIMEOUT};
pub use policy::{decide, HostKeyPolicy, PromptAction, HOST_KEY_ACCEPT};
pub use target::RemoteTarget;
