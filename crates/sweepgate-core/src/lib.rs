//! Sweepgate Core Library
//!
//! The campaign safety framework for bulk code transformations: risk-tiered
//! batching, pre-batch snapshots, post-batch validation, rollback on
//! failure, and manual-review gating. The text-rewrite engine, version
//! control, and the build tool are consumed as external collaborators.

pub mod assessor;
pub mod config;
pub mod domain;
pub mod exec;
pub mod fakes;
pub mod git;
pub mod ingest;
pub mod metrics;
pub mod obs;
pub mod orchestrator;
pub mod planner;
pub mod reporting;
pub mod review;
pub mod snapshot;
pub mod store;
pub mod telemetry;
pub mod validator;

pub use domain::{
    Batch, BatchResult, BatchStatus, CampaignError, CampaignState, CampaignStats, CampaignStatus,
    FileCandidate, FileCategory, FileOutcome, ManualReviewRequest, Result, ReviewStatus,
    RiskAssessment, RiskTier, SafetyCheckpoint,
};

pub use assessor::RiskAssessor;
pub use config::{BatchSizePolicy, CampaignConfig, CategoryRule, FeatureToggles, KeywordRule};
pub use exec::{CommandOutput, CommandRunner, ProcessRunner};
pub use git::{capture_head_sha, is_dirty, is_git_repo};
pub use ingest::{load_report, parse_report, AnalysisReport, ReportEntry, SiteVerdict};
pub use orchestrator::{CommandEngine, NoopEngine, Orchestrator, TransformEngine};
pub use planner::{BatchPlanner, ProcessingPlan};
pub use reporting::{render_campaign_md, render_plan_md, write_campaign_json, write_plan_json};
pub use review::ManualReviewQueue;
pub use snapshot::SnapshotManager;
pub use store::{StateStore, STATE_DIR};
pub use validator::{ValidationReport, Validator};

pub use metrics::METRICS;
pub use obs::{
    emit_batch_started, emit_batch_validated, emit_campaign_finished, emit_campaign_started,
    emit_checkpoint_degraded, emit_rollback_performed, CampaignSpan,
};
pub use telemetry::init_tracing;

/// Sweepgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
