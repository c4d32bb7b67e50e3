//! Remote Target
//!
//! Parsed description of a source-control remote: host, repository path and
//! the logical remote name it is fetched under.

use std::fmt;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// `[user@]host:path` as understood by git for ssh remotes
static SCP_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^@/:]+@)?(?P<host>[^@/:]+):(?P<path>.+)$")
        .expect("scp-like remote pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    url: String,
    remote_name: String,
    host: String,
    path: String,
}

impl RemoteTarget {
    /// Parse `url` fetched under `remote_name`.
    ///
    /// Accepts `scheme://[user@]host[:port]/path`, `[user@]host:path`, and
    /// falls back to treating anything else as a host-less path.
    pub fn parse(url: &str, remote_name: &str) -> Self {
        let (host, path) = split_url(url.trim());
        Self {
            url: url.to_string(),
            remote_name: remote_name.to_string(),
            host,
            path,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    /// Host without user or port; empty for local or opaque remotes
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Repository path without leading or trailing slashes
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Non-empty path segments, with `.` and `..` dropped
    pub fn path_segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| is_normal_segment(segment))
    }

    /// `host/seg/seg/...` as a relative directory
    pub fn relative_dir(&self) -> PathBuf {
        let mut dir = PathBuf::new();
        if is_normal_segment(&self.host) {
            dir.push(&self.host);
        }
        for segment in self.path_segments() {
            dir.push(segment);
        }
        dir
    }
}

impl fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.remote_name)
    }
}

fn split_url(url: &str) -> (String, String) {
    if url.contains("://") {
        if let Ok(parsed) = Url::parse(url) {
            let host = parsed.host_str().unwrap_or_default().to_string();
            return (host, trim_slashes(parsed.path()));
        }
    }

    if let Some(caps) = SCP_LIKE.captures(url) {
        return (caps["host"].to_string(), trim_slashes(&caps["path"]));
    }

    (String::new(), trim_slashes(url))
}

fn is_normal_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

fn trim_slashes(path: &str) -> String {
    path.trim_matches('/').to_string()
}
