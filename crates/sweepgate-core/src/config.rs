//! Campaign configuration: batch sizing, risk rules, validation commands,
//! and feature toggles.
//!
//! Every field has a production default, so `CampaignConfig::default()` is a
//! runnable configuration; a TOML file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{CampaignError, FileCategory, Result, RiskTier};

/// Maximum batch size per risk tier.
///
/// Higher tiers get smaller batches so a validation failure throws away
/// less work and the rollback surface stays small.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSizePolicy {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl Default for BatchSizePolicy {
    fn default() -> Self {
        Self {
            low: 15,
            medium: 15,
            high: 8,
            critical: 5,
        }
    }
}

impl BatchSizePolicy {
    /// Maximum batch size for the given tier.
    pub fn for_tier(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
            RiskTier::Critical => self.critical,
        }
    }
}

/// Maps a path fragment to a file category.
///
/// Rules are evaluated first-match-wins against the candidate's relative
/// path (substring match), so more specific fragments must come first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Fragment to match against relative paths (substring match).
    pub fragment: String,
    /// Category assigned when this rule matches.
    pub category: FileCategory,
}

impl CategoryRule {
    pub fn new(fragment: impl Into<String>, category: FileCategory) -> Self {
        Self {
            fragment: fragment.into(),
            category,
        }
    }

    /// Returns `true` if this rule matches the given relative path.
    pub fn matches(&self, relative_path: &str) -> bool {
        relative_path.contains(&self.fragment)
    }
}

/// A content-inspection rule: when `pattern` matches a candidate's source,
/// the named risk factor and its mitigation are attached to the assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Short identifier for logs and reports.
    pub name: String,
    /// Regex applied to file contents.
    pub pattern: String,
    /// Risk factor recorded when the pattern matches.
    pub risk_factor: String,
    /// Mitigation strategy recorded alongside the factor.
    pub mitigation: String,
}

/// Safety feature toggles. All enabled by default; disabling any of them
/// trades protection for speed and is meant for dry runs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    /// Create a git checkpoint before each batch.
    pub snapshots: bool,
    /// Restore the checkpoint when a batch fails validation.
    pub rollback: bool,
    /// Run per-category content checks after the build step.
    pub enhanced_validation: bool,
    /// Divert flagged candidates to the manual review queue.
    pub manual_review: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            snapshots: true,
            rollback: true,
            enhanced_validation: true,
            manual_review: true,
        }
    }
}

/// Top-level campaign configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Proposed-change count above which a candidate is flagged for
    /// manual review and its tier escalates one step.
    pub manual_review_threshold: usize,
    /// Per-tier batch size caps.
    pub batch_sizes: BatchSizePolicy,
    /// Build/typecheck command run after each batch, argv style.
    pub build_command: Vec<String>,
    /// Wall-clock limit for the build command. `None` means no limit.
    pub build_timeout_secs: Option<u64>,
    /// Path-fragment rules for categorising candidates, first-match-wins.
    pub category_rules: Vec<CategoryRule>,
    /// Content-inspection rules applied during risk assessment.
    pub keyword_rules: Vec<KeywordRule>,
    /// Symbols that must survive in every calculation file. Project
    /// specific, so the default is empty.
    pub required_symbols: Vec<String>,
    /// Markers expected in service files after a batch (any one suffices).
    pub export_markers: Vec<String>,
    /// Safety feature toggles.
    pub features: FeatureToggles,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            manual_review_threshold: 20,
            batch_sizes: BatchSizePolicy::default(),
            build_command: vec!["npx".into(), "tsc".into(), "--noEmit".into()],
            build_timeout_secs: None,
            category_rules: vec![
                CategoryRule::new("calculations", FileCategory::Calculation),
                CategoryRule::new("services", FileCategory::Service),
                CategoryRule::new(".test.", FileCategory::Test),
                CategoryRule::new("__tests__", FileCategory::Test),
                CategoryRule::new("components", FileCategory::Component),
                CategoryRule::new("utils", FileCategory::Utility),
            ],
            keyword_rules: vec![
                KeywordRule {
                    name: "core_calculation".into(),
                    pattern: r"(?i)\bcalculat(e|ion)|\balgorithm\b".into(),
                    risk_factor: "contains core calculation logic".into(),
                    mitigation: "run domain regression checks before accepting this batch".into(),
                },
                KeywordRule {
                    name: "monitoring".into(),
                    pattern: r"(?i)\bmetrics?\b|\bmonitor(ing)?\b|\btelemetry\b".into(),
                    risk_factor: "contains monitoring/metrics logic".into(),
                    mitigation: "confirm collectors and dashboards still receive data".into(),
                },
            ],
            required_symbols: Vec::new(),
            export_markers: vec!["export".into()],
            features: FeatureToggles::default(),
        }
    }
}

impl CampaignConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// any field the file omits.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| CampaignError::Configuration(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Classify a relative path using the category rules, first-match-wins.
    pub fn classify_path(&self, relative_path: &str) -> FileCategory {
        for rule in &self.category_rules {
            if rule.matches(relative_path) {
                return rule.category;
            }
        }
        FileCategory::Other
    }

    /// Fail-fast structural validation, run once at load time.
    pub fn validate(&self) -> Result<()> {
        if self.manual_review_threshold == 0 {
            return Err(CampaignError::Configuration(
                "manual_review_threshold must be greater than zero".into(),
            ));
        }
        for (tier, size) in RiskTier::ALL.map(|t| (t, self.batch_sizes.for_tier(t))) {
            if size == 0 {
                return Err(CampaignError::Configuration(format!(
                    "batch size for tier {tier} must be greater than zero"
                )));
            }
        }
        if self.build_command.is_empty() {
            return Err(CampaignError::Configuration(
                "build_command must not be empty".into(),
            ));
        }
        for rule in &self.category_rules {
            if rule.fragment.is_empty() {
                return Err(CampaignError::Configuration(
                    "category rule fragment must not be empty".into(),
                ));
            }
        }
        for rule in &self.keyword_rules {
            if let Err(e) = regex::Regex::new(&rule.pattern) {
                return Err(CampaignError::Configuration(format!(
                    "keyword rule '{}' has an invalid pattern: {e}",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}
