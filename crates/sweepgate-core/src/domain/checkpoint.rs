//! Safety checkpoints capturing the working tree before a batch is applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recoverable capture of working-tree state, taken before a batch runs.
///
/// The snapshot reference is a git stash commit; a clean tree produces no
/// commit, so restoring such a checkpoint is just a hard reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyCheckpoint {
    /// Unique identifier for this checkpoint.
    pub checkpoint_id: Uuid,
    /// The batch this checkpoint protects.
    pub batch_id: Uuid,
    /// Stash commit holding the pre-batch dirty state; `None` when the tree
    /// was clean at checkpoint time.
    pub stash_ref: Option<String>,
    /// When the checkpoint was taken.
    pub created_at: DateTime<Utc>,
}

impl SafetyCheckpoint {
    /// Create a checkpoint record.
    pub fn new(batch_id: Uuid, stash_ref: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            checkpoint_id: Uuid::new_v4(),
            batch_id,
            stash_ref,
            created_at: now,
        }
    }
}
