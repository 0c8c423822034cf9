//! Batches, the atomic unit of transformation and validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::FileCandidate;
use super::risk::RiskTier;

/// Processing status of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Planned, not yet applied.
    Pending,
    /// Currently being applied or validated.
    Running,
    /// Applied and validated; changes kept.
    Validated,
    /// Validation failed and the pre-batch checkpoint was restored.
    RolledBack,
}

impl BatchStatus {
    /// Whether the batch has reached a final state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Validated | Self::RolledBack)
    }
}

/// A tier-homogeneous group of candidates applied and validated as one unit.
///
/// Invariants: `candidates.len()` never exceeds the tier's configured maximum,
/// and every candidate in a batch shares the batch's tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique identifier for this batch.
    pub batch_id: Uuid,
    /// Risk tier shared by every file in the batch.
    pub tier: RiskTier,
    /// Files transformed together, in planned order.
    pub candidates: Vec<FileCandidate>,
    /// Current processing status.
    pub status: BatchStatus,
}

impl Batch {
    /// Create a pending batch.
    pub fn new(tier: RiskTier, candidates: Vec<FileCandidate>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            tier,
            candidates,
            status: BatchStatus::Pending,
        }
    }

    /// Number of files in the batch.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the batch contains no files.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Total proposed eliminations across the batch.
    pub fn proposed_changes(&self) -> usize {
        self.candidates.iter().map(|c| c.proposed_changes).sum()
    }
}

/// Outcome for one file within a processed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    /// Workspace-relative path of the file.
    pub relative_path: String,
    /// Eliminations actually applied by the transform engine.
    pub changes_applied: usize,
    /// Whether the engine reported success for this file.
    pub succeeded: bool,
}

/// Result of applying and validating one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// The batch this result belongs to.
    pub batch_id: Uuid,
    /// Tier of the batch.
    pub tier: RiskTier,
    /// Per-file outcomes from the transform engine.
    pub outcomes: Vec<FileOutcome>,
    /// Whether the build/type-check stage passed.
    pub compilation_passed: bool,
    /// Whether the pre-batch checkpoint was restored.
    pub rollback_performed: bool,
    /// Wall time spent applying and validating, in milliseconds.
    pub processing_time_ms: u64,
    /// Hard errors (build failures, missing domain symbols, restore failures).
    pub errors: Vec<String>,
    /// Advisory findings (degraded checkpoints, export-surface drift).
    pub warnings: Vec<String>,
    /// When the result was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl BatchResult {
    /// Whether the batch was applied, validated, and kept.
    pub fn succeeded(&self) -> bool {
        self.compilation_passed && !self.rollback_performed && self.errors.is_empty()
    }

    /// Eliminations applied across files the engine reported as succeeded.
    pub fn changes_applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| o.changes_applied)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::FileCategory;
    use std::path::Path;

    fn candidate(rel: &str, changes: usize) -> FileCandidate {
        FileCandidate::new(Path::new("/repo"), rel, FileCategory::Utility, changes)
    }

    #[test]
    fn test_batch_status_terminal() {
        assert!(!BatchStatus::Pending.is_terminal());
        assert!(!BatchStatus::Running.is_terminal());
        assert!(BatchStatus::Validated.is_terminal());
        assert!(BatchStatus::RolledBack.is_terminal());
    }

    #[test]
    fn test_new_batch_is_pending() {
        let batch = Batch::new(RiskTier::Low, vec![candidate("a.ts", 1), candidate("b.ts", 2)]);
        assert_eq!(batch.status, BatchStatus::Pending);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.proposed_changes(), 3);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_batch_result_succeeded() {
        let result = BatchResult {
            batch_id: Uuid::new_v4(),
            tier: RiskTier::Low,
            outcomes: vec![
                FileOutcome {
                    relative_path: "a.ts".into(),
                    changes_applied: 2,
                    succeeded: true,
                },
                FileOutcome {
                    relative_path: "b.ts".into(),
                    changes_applied: 4,
                    succeeded: false,
                },
            ],
            compilation_passed: true,
            rollback_performed: false,
            processing_time_ms: 120,
            errors: vec![],
            warnings: vec![],
            recorded_at: Utc::now(),
        };
        assert!(result.succeeded());
        assert_eq!(result.changes_applied(), 2);
    }

    #[test]
    fn test_batch_result_rollback_not_succeeded() {
        let result = BatchResult {
            batch_id: Uuid::new_v4(),
            tier: RiskTier::Critical,
            outcomes: vec![],
            compilation_passed: false,
            rollback_performed: true,
            processing_time_ms: 50,
            errors: vec!["error TS2304: Cannot find name 'Spirit'.".into()],
            warnings: vec![],
            recorded_at: Utc::now(),
        };
        assert!(!result.succeeded());
    }

    #[test]
    fn test_serde_roundtrip() {
        let batch = Batch::new(RiskTier::High, vec![candidate("src/services/api.ts", 5)]);
        let json = serde_json::to_string(&batch).unwrap();
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(batch, back);
    }
}
