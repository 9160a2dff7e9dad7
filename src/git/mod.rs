//! Git tag lookup used when a project computes its version at build time
//!
//! - [`runner`]: the process seam, [`GitRunner`] and its `git` implementation
//! - [`tags`]: tag discovery strategies, tag cleaning and validation

pub mod runner;
pub mod tags;

use std::path::PathBuf;

use thiserror::Error;

pub use runner::{GitRunner, SystemGit};
pub use tags::GitTagResolver;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Not a git repository: {}", .0.display())]
    NotAGitRepository(PathBuf),

    #[error("No version tags found in repository")]
    NoVersionTagsFound,

    #[error("git {args} failed: {stderr}")]
    CommandFailed { args: String, stderr: String },

    #[error("Failed to run git: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Outcome of a tag lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitTagResult {
    /// Cleaned version, `2.1.4` for tag `v2.1.4`
    pub version: String,
    /// Tag as reported by git
    pub tag: String,
    pub success: bool,
    pub is_git_repo: bool,
}
