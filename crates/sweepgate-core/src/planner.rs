//! Batch planning: partition candidates into size-bounded, risk-ordered
//! batches and divert manual-review candidates.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::assessor::RiskAssessor;
use crate::config::CampaignConfig;
use crate::domain::{Batch, FileCandidate, RiskAssessment, RiskTier};
use crate::metrics::METRICS;

/// The machine-readable output of planning.
///
/// Batches are ordered ascending by tier so the safest changes land first
/// and a validation failure localises to the riskiest batches at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPlan {
    /// Batches in execution order.
    pub batches: Vec<Batch>,
    /// Candidates diverted to manual review, not in any batch.
    pub manual_review: Vec<FileCandidate>,
    /// Assessment per candidate, keyed by relative path. Covers both
    /// batched and diverted candidates; the validator reads from here.
    pub assessments: BTreeMap<String, RiskAssessment>,
    /// Convenience count, equal to `batches.len()`.
    pub estimated_batches: usize,
}

impl ProcessingPlan {
    /// Candidates scheduled for automatic processing.
    pub fn auto_candidates(&self) -> usize {
        self.batches.iter().map(|b| b.len()).sum()
    }

    /// True when nothing is batched and nothing awaits review.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty() && self.manual_review.is_empty()
    }
}

/// Builds a [`ProcessingPlan`] from assessed candidates.
pub struct BatchPlanner<'a> {
    assessor: &'a RiskAssessor,
    config: &'a CampaignConfig,
}

impl<'a> BatchPlanner<'a> {
    pub fn new(assessor: &'a RiskAssessor, config: &'a CampaignConfig) -> Self {
        Self { assessor, config }
    }

    /// Plan a campaign over the given candidates.
    ///
    /// Candidates whose assessment requires manual review are diverted
    /// unless their relative path appears in `approved`. Empty input
    /// yields an empty, non-error plan.
    pub fn plan(
        &self,
        candidates: Vec<FileCandidate>,
        approved: &HashSet<String>,
    ) -> ProcessingPlan {
        let mut assessments = BTreeMap::new();
        let mut auto: Vec<(RiskTier, FileCandidate)> = Vec::new();
        let mut manual_review = Vec::new();

        for candidate in candidates {
            let assessment = self.assessor.assess(&candidate);
            let gate = self.config.features.manual_review
                && assessment.requires_manual_review
                && !approved.contains(&candidate.relative_path);
            assessments.insert(candidate.relative_path.clone(), assessment.clone());
            if gate {
                manual_review.push(candidate);
            } else {
                auto.push((assessment.tier, candidate));
            }
        }

        auto.sort_by(|(tier_a, a), (tier_b, b)| {
            tier_a
                .cmp(tier_b)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });
        manual_review.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let mut batches = Vec::new();
        for tier in RiskTier::ALL {
            let group: Vec<FileCandidate> = auto
                .iter()
                .filter(|(t, _)| *t == tier)
                .map(|(_, c)| c.clone())
                .collect();
            let max = self.config.batch_sizes.for_tier(tier);
            for chunk in group.chunks(max) {
                batches.push(Batch::new(tier, chunk.to_vec()));
                METRICS.inc_batches_planned();
            }
        }

        let estimated_batches = batches.len();
        ProcessingPlan {
            batches,
            manual_review,
            assessments,
            estimated_batches,
        }
    }
}
