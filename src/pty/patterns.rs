//! Prompt Patterns
//!
//! Textual signatures an interactive SSH-backed program prints when it wants
//! input, and the result type returned when waiting for one of them.

use std::fmt;

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::error::Result;

/// Kinds of prompts the remote command executor knows how to recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Username request (`Username for 'https://...': `)
    Username,
    /// Password request (`Password: `)
    Password,
    /// Unknown host key confirmation
    /// (`Are you sure you want to continue connecting (yes/no)?`)
    HostKeyConfirmation,
}

impl PromptKind {
    /// Whether answering this prompt would require a secret
    pub fn is_credential(&self) -> bool {
        matches!(self, PromptKind::Username | PromptKind::Password)
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptKind::Username => write!(f, "username"),
            PromptKind::Password => write!(f, "password"),
            PromptKind::HostKeyConfirmation => write!(f, "host key confirmation"),
        }
    }
}

/// Result of waiting for a prompt on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// One of the prompts appeared
    Matched(PromptKind),
    /// No prompt appeared within the timeout
    TimedOut,
    /// Output reached end-of-stream before any prompt appeared
    Exited,
}

/// A compiled prompt signature
#[derive(Debug, Clone)]
pub struct PromptPattern {
    kind: PromptKind,
    regex: Regex,
}

impl PromptPattern {
    /// Compile a pattern for the given prompt kind
    pub fn new(kind: PromptKind, pattern: &str) -> Result<Self> {
        Ok(Self {
            kind,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }
}

/// Location of a prompt inside the searched output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptMatch {
    pub kind: PromptKind,
    pub start: usize,
    pub end: usize,
}

/// Ordered set of prompt patterns
#[derive(Debug, Clone)]
pub struct PromptSet {
    patterns: Vec<PromptPattern>,
}

/// Line-anchored prompts printed by git/ssh. ASCII mode so arbitrary bytes
/// from the terminal never break matching.
const USERNAME_PATTERN: &str = r"(?m-u)^User.*: ";
const PASSWORD_PATTERN: &str = r"(?m-u)^Pass.*: ";
const HOST_KEY_PATTERN: &str = r"(?-u).*Are you sure you want to continue connecting.*";

static REMOTE_PROMPTS: Lazy<PromptSet> = Lazy::new(|| {
    PromptSet::new(vec![
        PromptPattern::new(PromptKind::Username, USERNAME_PATTERN)
            .expect("username prompt pattern is valid"),
        PromptPattern::new(PromptKind::Password, PASSWORD_PATTERN)
            .expect("password prompt pattern is valid"),
        PromptPattern::new(PromptKind::HostKeyConfirmation, HOST_KEY_PATTERN)
            .expect("host key prompt pattern is valid"),
    ])
});

impl PromptSet {
    pub fn new(patterns: Vec<PromptPattern>) -> Self {
        Self { patterns }
    }

    /// The username, password and host key prompts, in that order
    pub fn remote_prompts() -> &'static PromptSet {
        &REMOTE_PROMPTS
    }

    pub fn patterns(&self) -> &[PromptPattern] {
        &self.patterns
    }

    /// Find the prompt whose match starts first in `haystack`.
    ///
    /// Ties go to the pattern listed first.
    pub fn find_earliest(&self, haystack: &[u8]) -> Option<PromptMatch> {
        let mut best: Option<PromptMatch> = None;

        for pattern in &self.patterns {
            if let Some(m) = pattern.regex.find(haystack) {
                let candidate = PromptMatch {
                    kind: pattern.kind,
                    start: m.start(),
                    end: m.end(),
                };
                match best {
                    Some(current) if current.start <= candidate.start => {}
                    _ => best = Some(candidate),
                }
            }
        }

        best
    }

    /// Convenience wrapper over [`find_earliest`](Self::find_earliest) for text
    pub fn detect(&self, text: &str) -> Option<PromptKind> {
        self.find_earliest(text.as_bytes()).map(|m| m.kind)
    }
}
