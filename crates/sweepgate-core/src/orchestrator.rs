//! Sequential campaign orchestration: plan, then per batch checkpoint →
//! apply → validate, committing or rolling back, halting on the first
//! failed batch.
//!
//! `run` never returns an error. Every failure folds into the returned
//! [`CampaignState`] so callers always receive a complete record, and the
//! tree is left buildable: either every batch validated or the failing
//! batch was restored.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;

use crate::assessor::RiskAssessor;
use crate::config::CampaignConfig;
use crate::domain::{
    Batch, BatchResult, BatchStatus, CampaignError, CampaignState, CampaignStatus, FileCandidate,
    FileOutcome, Result,
};
use crate::exec::CommandRunner;
use crate::metrics::METRICS;
use crate::obs;
use crate::planner::{BatchPlanner, ProcessingPlan};
use crate::review::ManualReviewQueue;
use crate::snapshot::SnapshotManager;
use crate::validator::{ValidationReport, Validator};

/// The delegated transformation collaborator. The orchestrator sequences
/// and validates its output; what it rewrites is out of scope here.
#[async_trait]
pub trait TransformEngine: Send + Sync {
    /// Apply one batch's transformations, returning per-file outcomes.
    async fn apply_batch(&self, batch: &Batch, workspace: &Path) -> Result<Vec<FileOutcome>>;
}

/// Engine that invokes an external command with the batch's relative
/// paths appended as trailing arguments.
pub struct CommandEngine<'a> {
    runner: &'a dyn CommandRunner,
    command: Vec<String>,
    timeout_secs: Option<u64>,
}

impl<'a> CommandEngine<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        command: Vec<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            runner,
            command,
            timeout_secs,
        }
    }
}

#[async_trait]
impl TransformEngine for CommandEngine<'_> {
    async fn apply_batch(&self, batch: &Batch, workspace: &Path) -> Result<Vec<FileOutcome>> {
        if self.command.is_empty() {
            return Err(CampaignError::Command(
                "transform command is empty".to_string(),
            ));
        }
        let mut args: Vec<&str> = self.command[1..].iter().map(String::as_str).collect();
        for candidate in &batch.candidates {
            args.push(&candidate.relative_path);
        }
        let output = self
            .runner
            .run(&self.command[0], &args, workspace, self.timeout_secs)
            .await?;
        if !output.success() {
            return Err(CampaignError::Command(format!(
                "transform command exited with status {}: {}",
                output.exit_code,
                output.stderr.trim()
            )));
        }
        Ok(batch
            .candidates
            .iter()
            .map(|c| FileOutcome {
                relative_path: c.relative_path.clone(),
                changes_applied: c.proposed_changes,
                succeeded: true,
            })
            .collect())
    }
}

/// Engine that changes nothing. Dry runs report the outcomes a real
/// engine would claim, without touching any file.
pub struct NoopEngine;

#[async_trait]
impl TransformEngine for NoopEngine {
    async fn apply_batch(&self, batch: &Batch, _workspace: &Path) -> Result<Vec<FileOutcome>> {
        Ok(batch
            .candidates
            .iter()
            .map(|c| FileOutcome {
                relative_path: c.relative_path.clone(),
                changes_applied: c.proposed_changes,
                succeeded: true,
            })
            .collect())
    }
}

/// Drives one campaign from candidates to a terminal [`CampaignState`].
pub struct Orchestrator<'a> {
    config: &'a CampaignConfig,
    runner: &'a dyn CommandRunner,
    engine: &'a dyn TransformEngine,
    assessor: RiskAssessor,
    workspace: PathBuf,
    dry_run: bool,
}

impl<'a> Orchestrator<'a> {
    /// Build an orchestrator. Configuration problems surface here,
    /// before any file is touched.
    pub fn new(
        config: &'a CampaignConfig,
        runner: &'a dyn CommandRunner,
        engine: &'a dyn TransformEngine,
        workspace: &Path,
        dry_run: bool,
    ) -> Result<Self> {
        config.validate()?;
        let assessor = RiskAssessor::new(config)?;
        Ok(Self {
            config,
            runner,
            engine,
            assessor,
            workspace: workspace.to_path_buf(),
            dry_run,
        })
    }

    /// Produce a plan without applying anything.
    pub fn plan(&self, candidates: Vec<FileCandidate>, queue: &ManualReviewQueue) -> ProcessingPlan {
        BatchPlanner::new(&self.assessor, self.config).plan(candidates, &queue.approved_paths())
    }

    /// Run a full campaign over the given candidates.
    ///
    /// Manual-review candidates are pushed onto `queue` and excluded from
    /// processing; previously approved paths pass through. The returned
    /// state is always terminal.
    pub async fn run(
        &self,
        candidates: Vec<FileCandidate>,
        queue: &mut ManualReviewQueue,
        sites_preserved: usize,
    ) -> CampaignState {
        let mut state = CampaignState::start(sites_preserved, Utc::now());

        let ProcessingPlan {
            batches,
            manual_review,
            assessments,
            ..
        } = self.plan(candidates, queue);

        for candidate in manual_review {
            let assessment = assessments
                .get(&candidate.relative_path)
                .cloned()
                .unwrap_or_else(|| self.assessor.assess(&candidate));
            queue.push(candidate, assessment, Utc::now());
        }

        obs::emit_campaign_started(state.campaign_id, batches.len(), assessments.len());

        let snapshots =
            SnapshotManager::new(self.runner, &self.workspace, self.config.build_timeout_secs);
        let validator = Validator::new(self.runner, self.config, &self.workspace);

        for mut batch in batches {
            batch.status = BatchStatus::Running;
            obs::emit_batch_started(batch.batch_id, &batch.tier.to_string(), batch.len());
            let started = Instant::now();

            // Checkpoint. A snapshot failure degrades: the batch proceeds
            // without rollback cover, an explicit accepted risk.
            let checkpoint = if self.dry_run || !self.config.features.snapshots {
                None
            } else {
                match snapshots.create_checkpoint(batch.batch_id, Utc::now()).await {
                    Ok(checkpoint) => Some(checkpoint),
                    Err(e) => {
                        obs::emit_checkpoint_degraded(batch.batch_id, &e);
                        None
                    }
                }
            };

            // Apply, delegated to the external engine.
            let mut errors = Vec::new();
            let apply_outcome = self.engine.apply_batch(&batch, &self.workspace).await;
            let (outcomes, applied) = match apply_outcome {
                Ok(outcomes) => (outcomes, true),
                Err(e) => {
                    errors.push(format!("transform engine failed: {e}"));
                    let outcomes = batch
                        .candidates
                        .iter()
                        .map(|c| FileOutcome {
                            relative_path: c.relative_path.clone(),
                            changes_applied: 0,
                            succeeded: false,
                        })
                        .collect();
                    (outcomes, false)
                }
            };

            // Validate. Dry runs skip the build and semantic checks; an
            // apply failure skips straight to the failure path since the
            // tree's condition is unknown.
            let report = if self.dry_run {
                ValidationReport {
                    passed: true,
                    errors: Vec::new(),
                    warnings: Vec::new(),
                    requires_rollback: false,
                    build_exit_code: None,
                    duration_ms: 0,
                }
            } else if !applied {
                ValidationReport {
                    passed: false,
                    errors: Vec::new(),
                    warnings: Vec::new(),
                    requires_rollback: true,
                    build_exit_code: None,
                    duration_ms: 0,
                }
            } else {
                validator.validate_batch(&batch, &assessments).await
            };
            errors.extend(report.errors.clone());
            obs::emit_batch_validated(batch.batch_id, report.passed, report.duration_ms);

            let compilation_passed = report
                .build_exit_code
                .map_or(report.passed, |code| code == 0);

            if report.passed && applied {
                batch.status = BatchStatus::Validated;
                METRICS.inc_batches_validated();
                state.record_batch(BatchResult {
                    batch_id: batch.batch_id,
                    tier: batch.tier,
                    outcomes,
                    compilation_passed,
                    rollback_performed: false,
                    processing_time_ms: started.elapsed().as_millis() as u64,
                    errors,
                    warnings: report.warnings,
                    recorded_at: Utc::now(),
                });
                continue;
            }

            // Failure path: restore when possible, then halt. A failed
            // batch is evidence the transformation rules themselves may
            // be unsafe, so later batches are not attempted.
            let mut rollback_performed = false;
            let mut restore_failed = false;
            if self.config.features.rollback {
                match &checkpoint {
                    Some(checkpoint) => match snapshots.restore(checkpoint).await {
                        Ok(()) => {
                            rollback_performed = true;
                            batch.status = BatchStatus::RolledBack;
                            METRICS.inc_rollbacks();
                            obs::emit_rollback_performed(
                                batch.batch_id,
                                checkpoint.stash_ref.as_deref(),
                            );
                        }
                        Err(e) => {
                            restore_failed = true;
                            tracing::error!(batch_id = %batch.batch_id, error = %e, "restore failed");
                            errors.push(e.to_string());
                        }
                    },
                    None => {
                        tracing::warn!(
                            batch_id = %batch.batch_id,
                            "validation failed with no checkpoint to restore"
                        );
                    }
                }
            }

            let outcomes = outcomes
                .into_iter()
                .map(|o| FileOutcome {
                    succeeded: false,
                    ..o
                })
                .collect();
            state.record_batch(BatchResult {
                batch_id: batch.batch_id,
                tier: batch.tier,
                outcomes,
                compilation_passed,
                rollback_performed,
                processing_time_ms: started.elapsed().as_millis() as u64,
                errors,
                warnings: report.warnings,
                recorded_at: Utc::now(),
            });

            let status = if rollback_performed && !restore_failed {
                CampaignStatus::RolledBack
            } else {
                CampaignStatus::Failed
            };
            state.finish(status, Utc::now());
            break;
        }

        if !state.status.is_terminal() {
            state.finish(CampaignStatus::Completed, Utc::now());
        }
        state.pending_reviews = queue.pending().to_vec();
        obs::emit_campaign_finished(
            state.campaign_id,
            &state.status.to_string(),
            state.stats.files_processed,
        );
        METRICS.flush();
        state
    }
}
