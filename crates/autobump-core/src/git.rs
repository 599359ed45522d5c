//! Git lookups used as a fallback version source.
//!
//! Shells out to `git` so the user's own configuration applies. Nothing here
//! writes to the repository; committing a bump is left to the caller.

use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "tag").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Get the latest semver tag in `repo`, if any.
///
/// Looks for tags matching `v*` sorted by version. Outside a repository, or
/// in one without tags, this is `None`.
#[instrument]
pub fn latest_version_tag(repo: &Utf8Path) -> GitResult<Option<String>> {
    let output = match git(repo, &["tag", "--list", "v*", "--sort=-version:refname"]) {
        Ok(output) => output,
        Err(GitError::NotARepo | GitError::Command { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    let tag = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string);
    debug!(?tag, "latest version tag");
    Ok(tag)
}

/// Run a git command in `dir` and return its stdout.
fn git(dir: &Utf8Path, args: &[&str]) -> GitResult<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir.as_std_path())
        .args(args)
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if stderr.contains("not a git repository") {
            return Err(GitError::NotARepo);
        }

        Err(GitError::Command {
            command: args.first().unwrap_or(&"").to_string(),
            stderr,
        })
    }
}
