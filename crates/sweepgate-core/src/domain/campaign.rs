//! Campaign state, owned by the orchestrator and mutated only through
//! explicit transition methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::batch::BatchResult;
use super::review::ManualReviewRequest;

/// Terminal-or-running status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Batches are still being processed.
    Running,
    /// Every planned batch validated.
    Completed,
    /// Halted without a successful restore.
    Failed,
    /// Halted after a successful restore of the failing batch.
    RolledBack,
}

impl CampaignStatus {
    /// Whether the campaign has terminated.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::RolledBack => write!(f, "rolled_back"),
        }
    }
}

/// Cumulative campaign statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignStats {
    /// Files that reached validation in any batch.
    pub files_processed: usize,
    /// Eliminations kept by validated batches.
    pub changes_eliminated: usize,
    /// Sites the analysis report marked as preserved (never touched).
    pub sites_preserved: usize,
    /// Files in validated batches over files processed.
    pub success_rate: f32,
}

/// The single mutable record of a campaign, from start to termination.
///
/// Created once at orchestrator start; every batch folds its result in via
/// [`record_batch`](CampaignState::record_batch) until a terminal transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignState {
    /// Unique identifier for this campaign.
    pub campaign_id: Uuid,
    /// When the campaign started.
    pub started_at: DateTime<Utc>,
    /// When the campaign reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
    /// Current status.
    pub status: CampaignStatus,
    /// Cumulative statistics.
    pub stats: CampaignStats,
    /// Batch results in processing order.
    pub batch_results: Vec<BatchResult>,
    /// Reviews still pending when the campaign terminated.
    pub pending_reviews: Vec<ManualReviewRequest>,
}

impl CampaignState {
    /// Start a new running campaign.
    pub fn start(sites_preserved: usize, now: DateTime<Utc>) -> Self {
        Self {
            campaign_id: Uuid::new_v4(),
            started_at: now,
            finished_at: None,
            status: CampaignStatus::Running,
            stats: CampaignStats {
                files_processed: 0,
                changes_eliminated: 0,
                sites_preserved,
                success_rate: 0.0,
            },
            batch_results: Vec::new(),
            pending_reviews: Vec::new(),
        }
    }

    /// Fold one batch result into the cumulative stats.
    pub fn record_batch(&mut self, result: BatchResult) {
        self.stats.files_processed += result.outcomes.len();
        if result.succeeded() {
            self.stats.changes_eliminated += result.changes_applied();
        }
        self.batch_results.push(result);
        self.recompute_success_rate();
    }

    /// Transition to a terminal status.
    pub fn finish(&mut self, status: CampaignStatus, now: DateTime<Utc>) {
        debug_assert!(status.is_terminal(), "finish() takes a terminal status");
        self.status = status;
        self.finished_at = Some(now);
    }

    /// Number of batches that validated and were kept.
    pub fn succeeded_batches(&self) -> usize {
        self.batch_results.iter().filter(|r| r.succeeded()).count()
    }

    fn recompute_success_rate(&mut self) {
        let total: usize = self.batch_results.iter().map(|r| r.outcomes.len()).sum();
        let succeeded: usize = self
            .batch_results
            .iter()
            .filter(|r| r.succeeded())
            .map(|r| r.outcomes.len())
            .sum();
        self.stats.success_rate = if total == 0 {
            0.0
        } else {
            succeeded as f32 / total as f32
        };
    }
}
