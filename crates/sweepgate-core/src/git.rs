//! Git preflight helpers for capturing repository state.
//!
//! These go through the [`CommandRunner`] capability like every other
//! external invocation, so tests script them instead of spawning git.

use std::path::Path;

use crate::domain::{CampaignError, Result};
use crate::exec::CommandRunner;

/// Check whether a directory is inside a git work tree.
pub async fn is_git_repo(runner: &dyn CommandRunner, dir: &Path) -> bool {
    runner
        .run("git", &["rev-parse", "--is-inside-work-tree"], dir, None)
        .await
        .map(|o| o.success())
        .unwrap_or(false)
}

/// Capture the HEAD commit SHA.
///
/// Returns an error if the directory is not inside a git repository or if
/// git is not available.
pub async fn capture_head_sha(runner: &dyn CommandRunner, dir: &Path) -> Result<String> {
    let output = runner.run("git", &["rev-parse", "HEAD"], dir, None).await?;
    if !output.success() {
        return Err(CampaignError::Command(format!(
            "git rev-parse HEAD failed: {}",
            output.stderr
        )));
    }
    let sha = output.stdout.trim().to_string();
    if sha.is_empty() {
        return Err(CampaignError::Command(
            "git rev-parse HEAD returned empty output".to_string(),
        ));
    }
    Ok(sha)
}

/// Check whether the working tree has uncommitted changes.
pub async fn is_dirty(runner: &dyn CommandRunner, dir: &Path) -> Result<bool> {
    let output = runner
        .run("git", &["status", "--porcelain"], dir, None)
        .await?;
    if !output.success() {
        return Err(CampaignError::Command(format!(
            "git status failed: {}",
            output.stderr
        )));
    }
    Ok(!output.stdout.trim().is_empty())
}
