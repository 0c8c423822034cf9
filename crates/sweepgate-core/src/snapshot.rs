//! Working-tree snapshot and restore around each batch.
//!
//! Checkpointing uses `git stash create`, which captures the dirty tree as
//! an unanchored commit without touching the tree itself, followed by
//! `git stash store` to anchor the commit against garbage collection. A
//! clean tree produces a checkpoint with no stash ref; restore then only
//! needs the hard reset.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{CampaignError, Result, SafetyCheckpoint};
use crate::exec::CommandRunner;

/// Creates and restores [`SafetyCheckpoint`]s for a single workspace.
pub struct SnapshotManager<'a> {
    runner: &'a dyn CommandRunner,
    workspace: PathBuf,
    timeout_secs: Option<u64>,
}

impl<'a> SnapshotManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, workspace: &Path, timeout_secs: Option<u64>) -> Self {
        Self {
            runner,
            workspace: workspace.to_path_buf(),
            timeout_secs,
        }
    }

    /// Capture the current working tree as a checkpoint for `batch_id`.
    ///
    /// A clean tree yields `stash_ref = None`. Any git failure is a
    /// `Snapshot` error; the orchestrator decides whether to degrade.
    pub async fn create_checkpoint(
        &self,
        batch_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SafetyCheckpoint> {
        let message = format!("sweepgate batch {batch_id}");

        let create = self
            .runner
            .run(
                "git",
                &["stash", "create", &message],
                &self.workspace,
                self.timeout_secs,
            )
            .await
            .map_err(|e| CampaignError::Snapshot(e.to_string()))?;
        if !create.success() {
            return Err(CampaignError::Snapshot(format!(
                "git stash create failed: {}",
                create.stderr.trim()
            )));
        }

        let sha = create.stdout.trim();
        if sha.is_empty() {
            // Clean tree: nothing to capture beyond HEAD.
            tracing::debug!(batch_id = %batch_id, "working tree clean, checkpoint is HEAD only");
            return Ok(SafetyCheckpoint::new(batch_id, None, now));
        }

        let store = self
            .runner
            .run(
                "git",
                &["stash", "store", "-m", &message, sha],
                &self.workspace,
                self.timeout_secs,
            )
            .await
            .map_err(|e| CampaignError::Snapshot(e.to_string()))?;
        if !store.success() {
            return Err(CampaignError::Snapshot(format!(
                "git stash store failed: {}",
                store.stderr.trim()
            )));
        }

        tracing::debug!(batch_id = %batch_id, stash_ref = %sha, "checkpoint created");
        Ok(SafetyCheckpoint::new(batch_id, Some(sha.to_string()), now))
    }

    /// Restore the tree to the state captured by `checkpoint`.
    ///
    /// A hard reset first drops any partial batch edits; the stash (if one
    /// exists) then re-applies the checkpointed pre-batch state. Any
    /// failure is a fatal `Restore` error.
    pub async fn restore(&self, checkpoint: &SafetyCheckpoint) -> Result<()> {
        let reset = self
            .runner
            .run(
                "git",
                &["reset", "--hard", "HEAD"],
                &self.workspace,
                self.timeout_secs,
            )
            .await
            .map_err(|e| CampaignError::Restore(e.to_string()))?;
        if !reset.success() {
            return Err(CampaignError::Restore(format!(
                "git reset --hard failed: {}",
                reset.stderr.trim()
            )));
        }

        if let Some(stash_ref) = &checkpoint.stash_ref {
            let apply = self
                .runner
                .run(
                    "git",
                    &["stash", "apply", stash_ref],
                    &self.workspace,
                    self.timeout_secs,
                )
                .await
                .map_err(|e| CampaignError::Restore(e.to_string()))?;
            if !apply.success() {
                return Err(CampaignError::Restore(format!(
                    "git stash apply {stash_ref} failed: {}",
                    apply.stderr.trim()
                )));
            }
        }

        tracing::debug!(batch_id = %checkpoint.batch_id, "checkpoint restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeCommandRunner;

    #[tokio::test]
    async fn test_create_checkpoint_dirty_tree_stores_stash() {
        let runner = FakeCommandRunner::new();
        runner.respond_ok("git stash create", "deadbeef\n");
        let manager = SnapshotManager::new(&runner, Path::new("/repo"), None);

        let batch_id = Uuid::new_v4();
        let checkpoint = manager.create_checkpoint(batch_id, Utc::now()).await.unwrap();
        assert_eq!(checkpoint.batch_id, batch_id);
        assert_eq!(checkpoint.stash_ref.as_deref(), Some("deadbeef"));

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("git stash create sweepgate batch"));
        assert!(calls[1].starts_with("git stash store -m"));
        assert!(calls[1].ends_with("deadbeef"));
    }

    #[tokio::test]
    async fn test_create_checkpoint_clean_tree_has_no_ref() {
        let runner = FakeCommandRunner::new();
        // No script: the fake defaults to success with empty stdout, the
        // same shape `git stash create` gives on a clean tree.
        let manager = SnapshotManager::new(&runner, Path::new("/repo"), None);

        let checkpoint = manager
            .create_checkpoint(Uuid::new_v4(), Utc::now())
            .await
            .unwrap();
        assert!(checkpoint.stash_ref.is_none());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_create_checkpoint_git_failure_is_snapshot_error() {
        let runner = FakeCommandRunner::new();
        runner.respond_fail("git stash create", "fatal: not a git repository");
        let manager = SnapshotManager::new(&runner, Path::new("/repo"), None);

        let err = manager
            .create_checkpoint(Uuid::new_v4(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, CampaignError::Snapshot(_)));
    }

    #[tokio::test]
    async fn test_restore_resets_then_applies() {
        let runner = FakeCommandRunner::new();
        let manager = SnapshotManager::new(&runner, Path::new("/repo"), None);
        let checkpoint =
            SafetyCheckpoint::new(Uuid::new_v4(), Some("deadbeef".to_string()), Utc::now());

        manager.restore(&checkpoint).await.unwrap();
        let calls = runner.calls();
        assert_eq!(calls, vec!["git reset --hard HEAD", "git stash apply deadbeef"]);
    }

    #[tokio::test]
    async fn test_restore_clean_checkpoint_only_resets() {
        let runner = FakeCommandRunner::new();
        let manager = SnapshotManager::new(&runner, Path::new("/repo"), None);
        let checkpoint = SafetyCheckpoint::new(Uuid::new_v4(), None, Utc::now());

        manager.restore(&checkpoint).await.unwrap();
        assert_eq!(runner.calls(), vec!["git reset --hard HEAD"]);
    }

    #[tokio::test]
    async fn test_restore_failure_is_fatal_restore_error() {
        let runner = FakeCommandRunner::new();
        runner.respond_fail("git stash apply", "conflict");
        let manager = SnapshotManager::new(&runner, Path::new("/repo"), None);
        let checkpoint =
            SafetyCheckpoint::new(Uuid::new_v4(), Some("deadbeef".to_string()), Utc::now());

        let err = manager.restore(&checkpoint).await.unwrap_err();
        assert!(matches!(err, CampaignError::Restore(_)));
    }
}
