//! Process seam for git invocations

use std::path::Path;
use std::process::Command;

#[cfg(test)]
use mockall::automock;
use tracing::debug;

use crate::git::GitError;

/// Runs a git subcommand inside a working directory and returns its stdout
#[cfg_attr(test, automock)]
pub trait GitRunner: Send + Sync {
    fn run(&self, dir: &Path, args: &[&'static str]) -> Result<String, GitError>;
}

/// Spawns the `git` executable found on `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl GitRunner for SystemGit {
    fn run(&self, dir: &Path, args: &[&'static str]) -> Result<String, GitError> {
        debug!("Running git {} in {}", args.join(" "), dir.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(GitError::Spawn)?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
