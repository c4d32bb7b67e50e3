//! Integration Tests for PTY Sessions
//!
//! Real processes on a real PTY. Environments without PTY support (some CI
//! sandboxes) skip instead of failing.

use std::time::{Duration, Instant};

use gitexpect::config::ConfigStore;
use gitexpect::error::Error;
use gitexpect::pty::{
    InteractiveSession, PromptKind, PromptSet, PtyDriver, PtySession, SessionDriver, SpawnRequest, WaitOutcome,
};
use gitexpect::remote::{HostKeyPolicy, RemoteCommandExecutor, RemoteTarget};

const HOST_KEY_SCRIPT: &str = r#"printf 'The authenticity of host cannot be established.\r\nAre you sure you want to continue connecting (yes/no)? '
read answer
echo "answer=$answer"
[ "$answer" = yes ]"#;

fn sh(script: &str) -> SpawnRequest {
    SpawnRequest::new("/bin/sh").args(["-c", script])
}

fn spawn_or_skip(request: &SpawnRequest) -> Option<PtySession> {
    match PtyDriver::default().spawn(request) {
        Ok(session) => Some(session),
        Err(Error::PtyCreationFailed { reason, .. }) => {
            eprintln!("skipping: PTY unavailable: {}", reason);
            None
        }
        Err(e) => panic!("spawn failed: {}", e),
    }
}

fn target() -> RemoteTarget {
    RemoteTarget::parse("ssh://localhost/test/repo", "origin")
}

fn executor() -> RemoteCommandExecutor<PtyDriver> {
    RemoteCommandExecutor::new(PtyDriver::default()).with_prompt_timeout(Duration::from_secs(5))
}

fn pty_available() -> bool {
    spawn_or_skip(&SpawnRequest::new("/bin/true")).is_some()
}

#[test]
fn test_echo_runs_to_completion() {
    let Some(mut session) = spawn_or_skip(&SpawnRequest::new("/bin/echo").arg("hello")) else {
        return;
    };

    let outcome = session
        .wait_for_any(PromptSet::remote_prompts(), Duration::from_secs(5))
        .unwrap();
    assert_ne!(outcome, WaitOutcome::Matched(PromptKind::HostKeyConfirmation));

    session.wait_for_completion().unwrap();
    assert_eq!(session.exit_status().unwrap(), 0);
    assert!(session.output().contains("hello"));
}

#[test]
fn test_wait_with_unbounded_timeout_ends_at_exit() {
    let Some(mut session) = spawn_or_skip(&SpawnRequest::new("/bin/echo").arg("hello")) else {
        return;
    };

    let outcome = session
        .wait_for_any(PromptSet::remote_prompts(), Duration::MAX)
        .unwrap();
    assert_eq!(outcome, WaitOutcome::Exited);

    session.wait_for_completion().unwrap();
    assert_eq!(session.exit_status().unwrap(), 0);
}

#[test]
fn test_executor_with_huge_configured_timeout() {
    if !pty_available() {
        return;
    }
    let store = ConfigStore::default();
    store.update(|c| c.git.prompt_timeout_secs = u64::MAX);

    let output = RemoteCommandExecutor::new(PtyDriver::default())
        .with_prompt_timeout(store.prompt_timeout())
        .execute_remote_command(&target(), &sh("echo hi"), HostKeyPolicy::Strict)
        .unwrap();

    assert!(output.contains("hi"));
}

#[test]
fn test_exit_status_before_completion_is_an_error() {
    let Some(mut session) = spawn_or_skip(&SpawnRequest::new("/bin/sleep").arg("5")) else {
        return;
    };

    assert!(matches!(session.exit_status(), Err(Error::SessionNotTerminated { .. })));
    session.terminate();
}

#[test]
fn test_send_line_after_exit_is_rejected() {
    let Some(mut session) = spawn_or_skip(&SpawnRequest::new("/bin/true")) else {
        return;
    };

    session.wait_for_completion().unwrap();
    assert!(matches!(session.send_line("yes"), Err(Error::SessionClosed { .. })));
}

#[test]
fn test_wait_times_out_on_silent_process() {
    let Some(mut session) = spawn_or_skip(&SpawnRequest::new("/bin/sleep").arg("5")) else {
        return;
    };

    let start = Instant::now();
    let outcome = session
        .wait_for_any(PromptSet::remote_prompts(), Duration::from_millis(200))
        .unwrap();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(start.elapsed() < Duration::from_secs(4));

    session.terminate();
    session.terminate();
}

#[test]
fn test_host_key_prompt_is_detected_and_answered() {
    let Some(mut session) = spawn_or_skip(&sh(HOST_KEY_SCRIPT)) else {
        return;
    };

    let outcome = session
        .wait_for_any(PromptSet::remote_prompts(), Duration::from_secs(5))
        .unwrap();
    assert_eq!(outcome, WaitOutcome::Matched(PromptKind::HostKeyConfirmation));

    session.send_line("yes").unwrap();
    session.wait_for_completion().unwrap();

    assert_eq!(session.exit_status().unwrap(), 0);
    assert!(session.output().contains("answer=yes"));
}

#[test]
fn test_executor_accepts_host_key_when_permissive() {
    if !pty_available() {
        return;
    }

    let output = executor()
        .execute_remote_command(&target(), &sh(HOST_KEY_SCRIPT), HostKeyPolicy::Permissive)
        .unwrap();

    assert!(output.contains("answer=yes"));
}

#[test]
fn test_executor_rejects_host_key_when_strict() {
    if !pty_available() {
        return;
    }

    let start = Instant::now();
    let result = executor().execute_remote_command(&target(), &sh(HOST_KEY_SCRIPT), HostKeyPolicy::Strict);

    assert!(matches!(result, Err(Error::UntrustedHostKey { .. })));
    // The script blocks on `read`; returning at all means it was killed
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_executor_fails_on_password_prompt() {
    if !pty_available() {
        return;
    }

    let result = executor().execute_remote_command(
        &target(),
        &sh("printf 'Password: '; read secret"),
        HostKeyPolicy::Permissive,
    );

    assert!(matches!(
        result,
        Err(Error::CredentialsRequired {
            prompt: PromptKind::Password,
            ..
        })
    ));
}

#[test]
fn test_executor_reports_non_zero_exit() {
    if !pty_available() {
        return;
    }

    let result = executor().execute_remote_command(&target(), &sh("echo boom; exit 3"), HostKeyPolicy::Strict);

    match result {
        Err(Error::RemoteCommandFailed { exit_code, output, .. }) => {
            assert_eq!(exit_code, 3);
            assert!(output.contains("boom"));
        }
        other => panic!("expected RemoteCommandFailed, got {:?}", other),
    }
}

#[test]
fn test_working_directory_and_env_are_applied() {
    let dir = tempfile::TempDir::new().unwrap();
    let request = sh("pwd; echo \"marker=$GITEXPECT_TEST_MARKER\"")
        .working_directory(dir.path())
        .env("GITEXPECT_TEST_MARKER", "present");
    let Some(mut session) = spawn_or_skip(&request) else {
        return;
    };

    session.wait_for_completion().unwrap();

    let output = session.output();
    let canonical = dir.path().canonicalize().unwrap();
    assert!(output.contains(&canonical.display().to_string()));
    assert!(output.contains("marker=present"));
}
