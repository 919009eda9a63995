use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cmd::Cmd;

/// Check if we're in a git repository
pub fn is_git_repo() -> Result<bool> {
    Cmd::new("git")
        .args(&["rev-parse", "--git-dir"])
        .run_as_check()
}

/// Get the root directory of the work tree
pub fn get_repo_root() -> Result<PathBuf> {
    let path = Cmd::new("git")
        .args(&["rev-parse", "--show-toplevel"])
        .run_and_capture_stdout()
        .context("Failed to locate the repository root")?;
    Ok(PathBuf::from(path))
}

/// Get the current branch name. Empty when HEAD is detached.
pub fn get_current_branch() -> Result<String> {
    Cmd::new("git")
        .args(&["branch", "--show-current"])
        .run_and_capture_stdout()
}

/// Initialise a repository in the current directory
pub fn init() -> Result<()> {
    Cmd::new("git").args(&["init"]).run()?;
    Ok(())
}
