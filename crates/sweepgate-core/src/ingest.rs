//! Analysis-report ingestion.
//!
//! The upstream analyzer emits a JSON report of candidate change sites with
//! per-site preservation verdicts. This module consumes only what the core
//! needs: eliminate sites grouped by file into (path, count), plus the
//! preserved-site count for campaign stats. Everything else about the
//! analyzer's output format is out of scope.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::CampaignConfig;
use crate::domain::{CampaignError, FileCandidate, Result};

/// Per-site verdict from the upstream analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteVerdict {
    /// The site must survive the campaign untouched.
    Preserve,
    /// The site is a candidate for elimination.
    Eliminate,
}

/// One candidate change site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Workspace-relative path of the file containing the site.
    pub file: String,
    /// Symbol at the site, when the analyzer resolved one.
    #[serde(default)]
    pub symbol: Option<String>,
    /// 1-based line number, when known.
    #[serde(default)]
    pub line: Option<u32>,
    /// Preservation verdict.
    pub verdict: SiteVerdict,
    /// Analyzer's stated reason, free text.
    #[serde(default)]
    pub reason: Option<String>,
}

/// The full analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub entries: Vec<ReportEntry>,
}

impl AnalysisReport {
    /// Structural validation, run before any candidate is derived.
    pub fn validate(&self) -> Result<()> {
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.file.trim().is_empty() {
                return Err(CampaignError::AnalysisInput(format!(
                    "entry {idx} has an empty file path"
                )));
            }
        }
        Ok(())
    }

    /// Number of sites the analyzer marked as preserved.
    pub fn preserved_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.verdict == SiteVerdict::Preserve)
            .count()
    }

    /// Group eliminate sites by file into candidates, sorted by relative
    /// path. Category is derived from the configured path rules.
    pub fn into_candidates(
        self,
        workspace: &Path,
        config: &CampaignConfig,
    ) -> Vec<FileCandidate> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.entries {
            if entry.verdict == SiteVerdict::Eliminate {
                *counts.entry(entry.file).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .map(|(path, count)| {
                let category = config.classify_path(&path);
                FileCandidate::new(workspace, path, category, count)
            })
            .collect()
    }
}

/// Parse a report from raw JSON.
pub fn parse_report(raw: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport = serde_json::from_str(raw)
        .map_err(|e| CampaignError::AnalysisInput(format!("malformed analysis report: {e}")))?;
    report.validate()?;
    Ok(report)
}

/// Load and parse a report file.
pub fn load_report(path: &Path) -> Result<AnalysisReport> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CampaignError::AnalysisInput(format!("{}: {e}", path.display())))?;
    parse_report(&raw)
}
