//! Manual review queue: pending high-risk candidates awaiting a human
//! approve/reject decision.
//!
//! Resolution misses are `false` returns, not errors; approving a path
//! with no pending request is a harmless no-op.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FileCandidate, ManualReviewRequest, ReviewStatus, RiskAssessment};

/// Pending and resolved review requests for one campaign.
///
/// Round-trips through the artifact store so separate CLI invocations
/// (`review`, then `execute`) observe prior decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualReviewQueue {
    pending: Vec<ManualReviewRequest>,
    resolved: Vec<ManualReviewRequest>,
}

impl ManualReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a review request for a candidate. A path with a request
    /// already pending is not queued twice.
    pub fn push(
        &mut self,
        candidate: FileCandidate,
        assessment: RiskAssessment,
        now: DateTime<Utc>,
    ) {
        if self
            .pending
            .iter()
            .any(|r| r.candidate.relative_path == candidate.relative_path)
        {
            return;
        }
        self.pending
            .push(ManualReviewRequest::new(candidate, assessment, now));
    }

    /// Approve the pending request for `path`. Returns `false`, leaving
    /// the queue unchanged, when no pending request matches.
    pub fn approve(&mut self, path: &str, notes: Option<String>, now: DateTime<Utc>) -> bool {
        self.resolve(path, ReviewStatus::Approved, notes, now)
    }

    /// Reject the pending request for `path`. Returns `false`, leaving
    /// the queue unchanged, when no pending request matches.
    pub fn reject(&mut self, path: &str, reason: Option<String>, now: DateTime<Utc>) -> bool {
        self.resolve(path, ReviewStatus::Rejected, reason, now)
    }

    fn resolve(
        &mut self,
        path: &str,
        status: ReviewStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(idx) = self
            .pending
            .iter()
            .position(|r| r.candidate.relative_path == path)
        else {
            return false;
        };
        let mut request = self.pending.remove(idx);
        request.status = status;
        request.notes = notes;
        request.resolved_at = Some(now);
        self.resolved.push(request);
        true
    }

    /// Requests still awaiting a decision.
    pub fn pending(&self) -> &[ManualReviewRequest] {
        &self.pending
    }

    /// Requests already decided, in resolution order.
    pub fn resolved(&self) -> &[ManualReviewRequest] {
        &self.resolved
    }

    /// Relative paths with an approved review, for the planner's gate.
    pub fn approved_paths(&self) -> HashSet<String> {
        self.resolved
            .iter()
            .filter(|r| r.status == ReviewStatus::Approved)
            .map(|r| r.candidate.relative_path.clone())
            .collect()
    }

    /// Whether `path` has an approved review.
    pub fn is_approved(&self, path: &str) -> bool {
        self.resolved
            .iter()
            .any(|r| r.status == ReviewStatus::Approved && r.candidate.relative_path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.resolved.is_empty()
    }
}
