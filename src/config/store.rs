//! Shared configuration store
//!
//! Cheap-to-clone handle over the live [`Config`]. Readers take a fresh value
//! on every call, so a policy change is seen by the next command.

use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use super::Config;
use crate::remote::{HostKeyPolicy, MAX_PROMPT_TIMEOUT};

#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<Config>>,
}

impl ConfigStore {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Config> {
        // Config has no cross-field invariants; poisoning is ignored
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Config> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> Config {
        self.read().clone()
    }

    /// Current host key policy
    pub fn host_key_policy(&self) -> HostKeyPolicy {
        self.read().host_key_policy()
    }

    pub fn base_directory(&self) -> PathBuf {
        self.read().base_directory.clone()
    }

    /// Prompt wait, never longer than [`MAX_PROMPT_TIMEOUT`]
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.read().git.prompt_timeout_secs).min(MAX_PROMPT_TIMEOUT)
    }

    pub fn set_strict_host_key_checking(&self, strict: bool) {
        self.write().git.strict_host_key_checking = strict;
    }

    pub fn set_base_directory(&self, dir: impl Into<PathBuf>) {
        self.write().base_directory = dir.into();
    }

    /// Apply an arbitrary change under the write lock
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Config),
    {
        f(&mut self.write());
    }
}
