//! Error types and Result aliases for gitexpect

use std::path::PathBuf;

use crate::pty::PromptKind;

/// Result type alias for gitexpect operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for gitexpect
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // === PTY / session errors ===
    /// Failed to open a PTY pair
    #[error("Failed to create PTY for command '{command}': {reason}")]
    PtyCreationFailed { command: String, reason: String },

    /// Failed to spawn the command on the PTY
    #[error("Failed to spawn command '{command}': {reason}")]
    SpawnFailed { command: String, reason: String },

    /// Input was sent to a session whose process already terminated
    #[error("Session {session_id} is closed")]
    SessionClosed { session_id: String },

    /// Exit status requested before the process was reaped
    #[error("Session {session_id} has not terminated yet")]
    SessionNotTerminated { session_id: String },

    // === Remote command errors ===
    /// Strict host key checking rejected an unknown host
    #[error(
        "Failed to run remote command against '{target}': host key is not trusted and strict host key checking is enabled"
    )]
    UntrustedHostKey { target: String },

    /// The host key question was asked again after it had been accepted
    #[error("Host key confirmation for '{target}' was requested more than once")]
    HostKeyPromptRepeated { target: String },

    /// The remote asked for credentials that are never supplied
    #[error("Failed to run remote command against '{target}': unexpected {prompt} prompt")]
    CredentialsRequired { target: String, prompt: PromptKind },

    /// The remote command exited with a non-zero status
    #[error("Remote command '{command}' failed with exit code {exit_code}")]
    RemoteCommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    /// A local command inside a project exited with a non-zero status
    #[error("Command '{command}' failed with exit code {exit_code}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    #[error("Failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Configuration file not found
    #[error("Configuration file not found")]
    ConfigNotFound,

    /// Failed to parse configuration
    #[error("Failed to parse {format} config: {reason}")]
    ConfigParseFailed { format: String, reason: String },

    /// Failed to serialize configuration
    #[error("Failed to serialize config as {format}: {reason}")]
    ConfigSerializationFailed { format: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    // === Wrapped errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Regex compilation errors
    #[error("Regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// Local repository inspection errors
    #[error("Git repository error: {0}")]
    Repository(#[from] git2::Error),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// Generic errors
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Captured output attached to the error, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            Error::RemoteCommandFailed { output, .. } | Error::CommandFailed { output, .. } => {
                Some(output)
            }
            _ => None,
        }
    }

    /// Exit code of a failed command
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::RemoteCommandFailed { exit_code, .. } | Error::CommandFailed { exit_code, .. } => {
                Some(*exit_code)
            }
            _ => None,
        }
    }
}
