//! Manual review requests gating high-risk candidates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::candidate::{FileCandidate, FileCategory};
use super::risk::{RiskAssessment, RiskTier};

/// Status of a manual review request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Waiting for a human decision.
    Pending,
    /// Approved: the candidate may enter automatic batches.
    Approved,
    /// Rejected: the candidate stays out of this campaign.
    Rejected,
}

impl ReviewStatus {
    /// Whether the request has been resolved either way.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A high-risk candidate held for human approval.
///
/// Invariant: a candidate with `requires_manual_review` never enters an
/// automatically executed batch unless its request reached `Approved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualReviewRequest {
    /// The candidate held for review.
    pub candidate: FileCandidate,
    /// The assessment that triggered the hold.
    pub assessment: RiskAssessment,
    /// Advisory checklist for the reviewer, generated from the category.
    pub instructions: Vec<String>,
    /// Whether approval is mandatory (critical tier) rather than recommended.
    pub approval_required: bool,
    /// Current review status.
    pub status: ReviewStatus,
    /// Reviewer-supplied notes (approval) or reason (rejection).
    pub notes: Option<String>,
    /// When the request was created.
    pub requested_at: DateTime<Utc>,
    /// When the request was approved or rejected.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ManualReviewRequest {
    /// Create a pending request for a candidate.
    pub fn new(candidate: FileCandidate, assessment: RiskAssessment, now: DateTime<Utc>) -> Self {
        let instructions = review_instructions(candidate.category, candidate.proposed_changes);
        let approval_required = assessment.tier == RiskTier::Critical;
        Self {
            candidate,
            assessment,
            instructions,
            approval_required,
            status: ReviewStatus::Pending,
            notes: None,
            requested_at: now,
            resolved_at: None,
        }
    }
}

/// Generate the reviewer checklist for a category.
///
/// Deterministic advisory text for a human; nothing here is machine-enforced.
pub fn review_instructions(category: FileCategory, proposed_changes: usize) -> Vec<String> {
    let mut steps = vec![format!(
        "review the {proposed_changes} proposed elimination(s) in the unified diff"
    )];
    match category {
        FileCategory::Calculation => {
            steps.push("verify no core-algorithm symbols are eliminated".to_string());
            steps.push("compare representative outputs against a known-good run".to_string());
        }
        FileCategory::Service => {
            steps.push("verify API integration points remain functional".to_string());
            steps.push("check downstream consumers of the exported surface".to_string());
        }
        FileCategory::Component => {
            steps.push("spot-check rendering paths and prop usage".to_string());
        }
        FileCategory::Utility | FileCategory::Test | FileCategory::Other => {
            steps.push("confirm the eliminated symbols have no remaining references".to_string());
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn assessment(tier: RiskTier) -> RiskAssessment {
        RiskAssessment {
            tier,
            risk_factors: vec![],
            mitigation_strategies: vec![],
            requires_manual_review: true,
            requires_enhanced_validation: tier.requires_enhanced_validation(),
            recommended_batch_size: 5,
        }
    }

    #[test]
    fn test_critical_request_requires_approval() {
        let candidate = FileCandidate::new(
            Path::new("/repo"),
            "src/calculations/core.ts",
            FileCategory::Calculation,
            25,
        );
        let req = ManualReviewRequest::new(candidate, assessment(RiskTier::Critical), Utc::now());
        assert!(req.approval_required);
        assert_eq!(req.status, ReviewStatus::Pending);
        assert!(req.resolved_at.is_none());
    }

    #[test]
    fn test_high_request_approval_recommended_only() {
        let candidate = FileCandidate::new(
            Path::new("/repo"),
            "src/services/api.ts",
            FileCategory::Service,
            30,
        );
        let req = ManualReviewRequest::new(candidate, assessment(RiskTier::High), Utc::now());
        assert!(!req.approval_required);
    }

    #[test]
    fn test_instructions_vary_by_category() {
        let calc = review_instructions(FileCategory::Calculation, 4);
        assert!(calc.iter().any(|s| s.contains("core-algorithm")));

        let service = review_instructions(FileCategory::Service, 4);
        assert!(service.iter().any(|s| s.contains("API integration")));

        let other = review_instructions(FileCategory::Other, 4);
        assert!(other.iter().any(|s| s.contains("remaining references")));
    }

    #[test]
    fn test_instructions_deterministic() {
        let a = review_instructions(FileCategory::Service, 7);
        let b = review_instructions(FileCategory::Service, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_review_status_resolved() {
        assert!(!ReviewStatus::Pending.is_resolved());
        assert!(ReviewStatus::Approved.is_resolved());
        assert!(ReviewStatus::Rejected.is_resolved());
    }
}
