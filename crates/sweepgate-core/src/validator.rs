//! Post-batch validation: a whole-project build/type check, then
//! category-specific semantic checks for files flagged during assessment.
//!
//! Compilation and domain-completeness are mechanically verifiable and
//! safety-critical, so their failures force rollback. Export-surface
//! presence is a heuristic that can false-positive, so its absence is
//! only a warning.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::CampaignConfig;
use crate::domain::{Batch, FileCategory, RiskAssessment};
use crate::exec::CommandRunner;

/// Aggregated verdict for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Whether the orchestrator must restore the pre-batch checkpoint.
    pub requires_rollback: bool,
    /// Exit code of the build command, when it ran.
    pub build_exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl ValidationReport {
    fn failed(errors: Vec<String>, build_exit_code: Option<i32>, duration_ms: u64) -> Self {
        Self {
            passed: false,
            errors,
            warnings: Vec::new(),
            requires_rollback: true,
            build_exit_code,
            duration_ms,
        }
    }
}

/// Runs the build command and semantic checks for each batch.
pub struct Validator<'a> {
    runner: &'a dyn CommandRunner,
    config: &'a CampaignConfig,
    workspace: PathBuf,
}

impl<'a> Validator<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        config: &'a CampaignConfig,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            config,
            workspace: workspace.into(),
        }
    }

    /// Validate one applied batch. Never fails: every problem, including a
    /// build tool that could not be spawned, folds into the report.
    pub async fn validate_batch(
        &self,
        batch: &Batch,
        assessments: &BTreeMap<String, RiskAssessment>,
    ) -> ValidationReport {
        let start = Instant::now();

        // Stage 1: whole-project build/type check, short-circuiting.
        let program = &self.config.build_command[0];
        let args: Vec<&str> = self.config.build_command[1..]
            .iter()
            .map(String::as_str)
            .collect();
        let output = match self
            .runner
            .run(program, &args, &self.workspace, self.config.build_timeout_secs)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return ValidationReport::failed(
                    vec![format!("build command could not run: {e}")],
                    None,
                    start.elapsed().as_millis() as u64,
                );
            }
        };

        if output.timed_out {
            return ValidationReport::failed(
                vec![format!(
                    "build command exceeded its time limit: {}",
                    output.stderr.trim()
                )],
                Some(output.exit_code),
                start.elapsed().as_millis() as u64,
            );
        }
        if !output.success() {
            let mut errors = vec![format!(
                "build command exited with status {}",
                output.exit_code
            )];
            if !output.stderr.trim().is_empty() {
                errors.push(output.stderr.trim().to_string());
            }
            if !output.stdout.trim().is_empty() {
                errors.push(output.stdout.trim().to_string());
            }
            return ValidationReport::failed(
                errors,
                Some(output.exit_code),
                start.elapsed().as_millis() as u64,
            );
        }

        // Stage 2: semantic checks for flagged files.
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        if self.config.features.enhanced_validation {
            for candidate in &batch.candidates {
                let needs_enhanced = assessments
                    .get(&candidate.relative_path)
                    .map(|a| a.requires_enhanced_validation)
                    .unwrap_or_else(|| batch.tier.requires_enhanced_validation());
                if !needs_enhanced {
                    continue;
                }
                match candidate.category {
                    FileCategory::Calculation => {
                        self.check_required_symbols(candidate, &mut errors);
                    }
                    FileCategory::Service => {
                        self.check_export_markers(candidate, &mut warnings);
                    }
                    _ => {}
                }
            }
        }

        let requires_rollback = !errors.is_empty();
        ValidationReport {
            passed: errors.is_empty(),
            errors,
            warnings,
            requires_rollback,
            build_exit_code: Some(output.exit_code),
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Every configured domain symbol must survive in a calculation file.
    /// Absence, or an unreadable file, is a hard error forcing rollback.
    fn check_required_symbols(
        &self,
        candidate: &crate::domain::FileCandidate,
        errors: &mut Vec<String>,
    ) {
        if self.config.required_symbols.is_empty() {
            return;
        }
        let content = match std::fs::read_to_string(&candidate.path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(format!(
                    "{}: unreadable during domain-completeness check: {e}",
                    candidate.relative_path
                ));
                return;
            }
        };
        for symbol in &self.config.required_symbols {
            if !content.contains(symbol) {
                errors.push(format!(
                    "{}: required domain symbol '{symbol}' is no longer present",
                    candidate.relative_path
                ));
            }
        }
    }

    /// A service file should retain at least one export-surface marker.
    /// Absence is advisory only.
    fn check_export_markers(
        &self,
        candidate: &crate::domain::FileCandidate,
        warnings: &mut Vec<String>,
    ) {
        if self.config.export_markers.is_empty() {
            return;
        }
        let content = match std::fs::read_to_string(&candidate.path) {
            Ok(c) => c,
            Err(e) => {
                warnings.push(format!(
                    "{}: unreadable during export-surface check: {e}",
                    candidate.relative_path
                ));
                return;
            }
        };
        let has_marker = self
            .config
            .export_markers
            .iter()
            .any(|marker| content.contains(marker));
        if !has_marker {
            warnings.push(format!(
                "{}: no export-surface marker remains after the batch",
                candidate.relative_path
            ));
        }
    }
}
