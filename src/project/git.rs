//! Git project type
//!
//! A repository handle identified by url, remote name and branch. Remote git
//! operations go through the [`RemoteCommandExecutor`]; commands inside the
//! checked-out project go through a [`CommandRunner`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use git2::Repository;

use crate::config::ConfigStore;
use crate::error::{Error, Result};
use crate::execution::{CommandRunner, ShellRunner};
use crate::pty::{PtyDriver, SessionDriver, SpawnConfig, SpawnRequest};
use crate::remote::{RemoteCommandExecutor, RemoteTarget};

pub struct Git<D = PtyDriver, R = ShellRunner>
where
    D: SessionDriver,
    R: CommandRunner,
{
    target: RemoteTarget,
    branch: String,
    config: ConfigStore,
    project_directory: Option<PathBuf>,
    driver: Arc<D>,
    runner: R,
}

impl Git {
    /// Handle backed by a native PTY and `sh`
    pub fn new(url: &str, remote: &str, branch: &str, config: ConfigStore) -> Self {
        let driver = PtyDriver::new(SpawnConfig::from(&config.snapshot().pty));
        Self::with_parts(url, remote, branch, config, driver, ShellRunner::new())
    }
}

impl<D, R> Git<D, R>
where
    D: SessionDriver,
    R: CommandRunner,
{
    pub fn with_parts(
        url: &str,
        remote: &str,
        branch: &str,
        config: ConfigStore,
        driver: D,
        runner: R,
    ) -> Self {
        Self {
            target: RemoteTarget::parse(url, remote),
            branch: branch.to_string(),
            config,
            project_directory: None,
            driver: Arc::new(driver),
            runner,
        }
    }

    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }

    pub fn url(&self) -> &str {
        self.target.url()
    }

    pub fn remote_name(&self) -> &str {
        self.target.remote_name()
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Directory project commands run in, once set or fetched
    pub fn project_directory(&self) -> Option<&Path> {
        self.project_directory.as_deref()
    }

    pub fn set_project_directory(&mut self, dir: impl Into<PathBuf>) {
        self.project_directory = Some(dir.into());
    }

    /// `<base>/timings/<remote>/<host>/<path...>/<job>.timing.json`
    pub fn timing_file_path(&self, job_name: &str) -> PathBuf {
        self.config
            .base_directory()
            .join("timings")
            .join(self.target.remote_name())
            .join(self.target.relative_dir())
            .join(format!("{}.timing.json", job_name))
    }

    /// `<base>/repos/git/<host>/<path...>`
    pub fn repo_directory(&self) -> PathBuf {
        self.config
            .base_directory()
            .join("repos")
            .join("git")
            .join(self.target.relative_dir())
    }

    fn effective_project_directory(&self) -> PathBuf {
        self.project_directory
            .clone()
            .unwrap_or_else(|| self.repo_directory())
    }

    /// Run `command` in the project with `PROJECT_DIR` exported.
    ///
    /// The project directory becomes the working directory only if it exists
    /// when the command starts. Returns the combined output and exit code.
    pub async fn execute_command_in_project(&self, command: &str) -> Result<(String, i32)> {
        let project_dir = self.effective_project_directory();
        let full_command = format!("export PROJECT_DIR=\"{}\"; {}", project_dir.display(), command);
        let cwd = project_dir.exists().then_some(project_dir.as_path());

        let result = self.runner.run(&full_command, cwd, &HashMap::new()).await?;
        Ok((result.output, result.exit_code))
    }

    /// Run `git <args>` against the remote with the current host key policy
    pub fn execute_git_remote_command<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = git_request(args, &self.repo_directory());
        run_remote(&self.driver, &self.target, &self.config, &request)
    }

    /// Fetch the configured branch into the repo directory and check it out.
    ///
    /// Clones first when the directory holds no repository. On success the
    /// repo directory becomes the project directory.
    pub async fn fetch_project(&mut self) -> Result<()>
    where
        D: 'static,
    {
        let repo_dir = self.repo_directory();
        tokio::fs::create_dir_all(&repo_dir).await?;

        let cloned = match Repository::open(&repo_dir) {
            Ok(repo) => {
                if repo.find_remote(self.target.remote_name()).is_err() {
                    debug!("adding remote {} -> {}", self.target.remote_name(), self.target.url());
                    repo.remote(self.target.remote_name(), self.target.url())?;
                }
                true
            }
            Err(_) => false,
        };

        if !cloned {
            info!("cloning {} into {}", self.target.url(), repo_dir.display());
            self.execute_git_remote_command_async(vec![
                "clone".to_string(),
                "--origin".to_string(),
                self.target.remote_name().to_string(),
                self.target.url().to_string(),
                ".".to_string(),
            ])
            .await?;
        }

        self.execute_git_remote_command_async(vec![
            "fetch".to_string(),
            self.target.remote_name().to_string(),
            self.branch.clone(),
        ])
        .await?;

        let checkout = "git checkout FETCH_HEAD";
        let result = self
            .runner
            .run(checkout, Some(&repo_dir), &HashMap::new())
            .await?;
        if !result.success() {
            return Err(Error::CommandFailed {
                command: checkout.to_string(),
                exit_code: result.exit_code,
                output: result.output,
            });
        }

        self.project_directory = Some(repo_dir);
        Ok(())
    }
}

impl<D, R> Git<D, R>
where
    D: SessionDriver + 'static,
    R: CommandRunner,
{
    /// [`execute_git_remote_command`](Self::execute_git_remote_command) on
    /// the blocking pool
    pub async fn execute_git_remote_command_async(&self, args: Vec<String>) -> Result<String> {
        let driver = Arc::clone(&self.driver);
        let target = self.target.clone();
        let config = self.config.clone();
        let request = git_request(args, &self.repo_directory());

        tokio::task::spawn_blocking(move || run_remote(&driver, &target, &config, &request)).await?
    }
}

fn git_request<I, S>(args: I, repo_dir: &Path) -> SpawnRequest
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let request = SpawnRequest::new("git").args(args);
    if repo_dir.exists() {
        request.working_directory(repo_dir)
    } else {
        request
    }
}

/// Policy and timeout come from the store on every call
fn run_remote<D: SessionDriver>(
    driver: &Arc<D>,
    target: &RemoteTarget,
    config: &ConfigStore,
    request: &SpawnRequest,
) -> Result<String> {
    RemoteCommandExecutor::new(Arc::clone(driver))
        .with_prompt_timeout(config.prompt_timeout())
        .execute_remote_command(target, request, config.host_key_policy())
}
