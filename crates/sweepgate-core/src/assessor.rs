//! Risk assessment for transformation candidates.
//!
//! Assessment is deterministic: identical (path, content, count) inputs
//! always produce an identical [`RiskAssessment`]. File content is read
//! best-effort; an unreadable file skips the keyword scan with a warning
//! rather than failing the campaign.

use regex::Regex;

use crate::config::{BatchSizePolicy, CampaignConfig};
use crate::domain::{FileCandidate, FileCategory, Result, RiskAssessment, RiskTier};
use crate::metrics::METRICS;

struct CompiledKeywordRule {
    name: String,
    pattern: Regex,
    risk_factor: String,
    mitigation: String,
}

/// Computes a [`RiskAssessment`] per candidate from configured thresholds,
/// batch sizes, and keyword rules.
pub struct RiskAssessor {
    manual_review_threshold: usize,
    batch_sizes: BatchSizePolicy,
    keyword_rules: Vec<CompiledKeywordRule>,
}

impl RiskAssessor {
    /// Build an assessor from validated configuration, compiling the
    /// keyword patterns once up front.
    pub fn new(config: &CampaignConfig) -> Result<Self> {
        let mut keyword_rules = Vec::with_capacity(config.keyword_rules.len());
        for rule in &config.keyword_rules {
            let pattern = Regex::new(&rule.pattern).map_err(|e| {
                crate::domain::CampaignError::Configuration(format!(
                    "keyword rule '{}' has an invalid pattern: {e}",
                    rule.name
                ))
            })?;
            keyword_rules.push(CompiledKeywordRule {
                name: rule.name.clone(),
                pattern,
                risk_factor: rule.risk_factor.clone(),
                mitigation: rule.mitigation.clone(),
            });
        }
        Ok(Self {
            manual_review_threshold: config.manual_review_threshold,
            batch_sizes: config.batch_sizes,
            keyword_rules,
        })
    }

    /// Assess a candidate, reading its content from disk best-effort.
    pub fn assess(&self, candidate: &FileCandidate) -> RiskAssessment {
        let content = match std::fs::read_to_string(&candidate.path) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(
                    path = %candidate.path.display(),
                    error = %e,
                    "candidate content unreadable, skipping keyword scan"
                );
                None
            }
        };
        METRICS.inc_files_assessed();
        self.assess_with_content(candidate, content.as_deref())
    }

    /// Pure assessment over already-loaded content. `None` content skips
    /// the keyword scan.
    pub fn assess_with_content(
        &self,
        candidate: &FileCandidate,
        content: Option<&str>,
    ) -> RiskAssessment {
        let mut risk_factors = Vec::new();
        let mut mitigation_strategies = Vec::new();

        let mut tier = match candidate.category {
            FileCategory::Calculation => {
                risk_factors.push("calculation file holds core domain logic".to_string());
                mitigation_strategies
                    .push("process in small batches with enhanced validation".to_string());
                RiskTier::Critical
            }
            FileCategory::Service => {
                risk_factors.push("service file shapes the external API surface".to_string());
                mitigation_strategies
                    .push("verify integration points after the batch".to_string());
                RiskTier::High
            }
            _ => RiskTier::Low,
        };

        let mut requires_manual_review = false;
        if candidate.proposed_changes > self.manual_review_threshold {
            tier = tier.max(tier.escalate());
            requires_manual_review = true;
            risk_factors.push(format!(
                "{} proposed changes exceed the review threshold ({})",
                candidate.proposed_changes, self.manual_review_threshold
            ));
            mitigation_strategies
                .push("split the work or secure manual approval first".to_string());
        }

        let mut content_flagged = false;
        if let Some(content) = content {
            for rule in &self.keyword_rules {
                if rule.pattern.is_match(content) {
                    content_flagged = true;
                    tracing::debug!(
                        rule = %rule.name,
                        path = %candidate.relative_path,
                        "keyword rule matched"
                    );
                    risk_factors.push(rule.risk_factor.clone());
                    mitigation_strategies.push(rule.mitigation.clone());
                }
            }
        }

        RiskAssessment {
            tier,
            risk_factors,
            mitigation_strategies,
            requires_manual_review,
            requires_enhanced_validation: tier.requires_enhanced_validation() || content_flagged,
            recommended_batch_size: self.batch_sizes.for_tier(tier),
        }
    }
}
