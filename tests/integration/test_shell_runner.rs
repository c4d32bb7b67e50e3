//! Integration Tests for the Shell Runner

use std::collections::HashMap;

use gitexpect::execution::{CommandRunner, ShellRunner};
use tempfile::TempDir;

#[tokio::test]
async fn test_cwd_is_applied() {
    let dir = TempDir::new().unwrap();
    let runner = ShellRunner::new();

    let result = runner.run("pwd", Some(dir.path()), &HashMap::new()).await.unwrap();

    let canonical = dir.path().canonicalize().unwrap();
    assert_eq!(result.output.trim(), canonical.display().to_string());
}

#[tokio::test]
async fn test_env_is_passed() {
    let runner = ShellRunner::new();
    let mut env = HashMap::new();
    env.insert("GITEXPECT_JOB".to_string(), "QUnit".to_string());

    let result = runner.run("echo \"$GITEXPECT_JOB\"", None, &env).await.unwrap();

    assert_eq!(result.output.trim(), "QUnit");
}

#[tokio::test]
async fn test_missing_cwd_is_an_error() {
    let dir = TempDir::new().unwrap();
    let runner = ShellRunner::new();

    let result = runner
        .run("true", Some(&dir.path().join("missing")), &HashMap::new())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_exported_project_dir_is_visible() {
    let dir = TempDir::new().unwrap();
    let runner = ShellRunner::new();
    let command = format!("export PROJECT_DIR=\"{}\"; echo \"$PROJECT_DIR\"", dir.path().display());

    let result = runner.run(&command, Some(dir.path()), &HashMap::new()).await.unwrap();

    assert!(result.success());
    assert_eq!(result.output.trim(), dir.path().display().to_string());
}

#[tokio::test]
async fn test_independent_commands_run_concurrently() {
    let runner = ShellRunner::new();
    let env = HashMap::new();
    let start = std::time::Instant::now();

    let (a, b) = tokio::join!(
        runner.run("sleep 0.5; echo a", None, &env),
        runner.run("sleep 0.5; echo b", None, &env)
    );

    assert_eq!(a.unwrap().output.trim(), "a");
    assert_eq!(b.unwrap().output.trim(), "b");
    assert!(start.elapsed() < std::time::Duration::from_millis(950));
}
