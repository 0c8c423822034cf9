//! Risk tiers and assessments driving batch sizing and review gating.

use serde::{Deserialize, Serialize};

/// Risk tier assigned to a candidate file.
///
/// Higher tiers get smaller batches and stricter review gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Routine change: largest batches, no gating.
    Low,
    /// Elevated change volume on otherwise routine code.
    Medium,
    /// Service-layer code: enhanced validation required.
    High,
    /// Core calculation code: smallest batches, manual review candidates.
    Critical,
}

impl RiskTier {
    /// All tiers in ascending severity order.
    pub const ALL: [RiskTier; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// The next tier up, saturating at `Critical`.
    ///
    /// Combined with the path-derived tier via `max`, so escalation can never
    /// downgrade and new tiers slot into the order without touching callers.
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }

    /// Whether this tier alone forces enhanced (semantic) validation.
    pub fn requires_enhanced_validation(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Deterministic risk assessment for one candidate file.
///
/// Recomputing with identical (path, content, count) inputs always yields an
/// identical assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Final tier after category base and change-count escalation.
    pub tier: RiskTier,
    /// Why this file is risky (category base plus any content matches).
    pub risk_factors: Vec<String>,
    /// Suggested mitigations, parallel to the risk factors.
    pub mitigation_strategies: Vec<String>,
    /// Whether a human must approve this file before automatic processing.
    pub requires_manual_review: bool,
    /// Whether the batch containing this file needs semantic validation.
    pub requires_enhanced_validation: bool,
    /// Configured batch-size ceiling for this file's tier.
    pub recommended_batch_size: usize,
}
