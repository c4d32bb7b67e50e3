//! Project types
//!
//! A project type knows where a project's source comes from, how to fetch it
//! and where its per-job state lives.

pub mod git;

pub use git::Git;
