//! Structured observability hooks for campaign lifecycle events.
//!
//! This module provides:
//! - Campaign-scoped tracing spans via the `CampaignSpan` RAII guard
//! - Emission functions for key lifecycle events: campaign start/finish,
//!   batch start/validation, checkpoint degradation, rollback
//!
//! Events are emitted at `info!` level and filtered through `RUST_LOG`.

use tracing::{info, warn};
use uuid::Uuid;

/// RAII guard that enters a campaign-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = CampaignSpan::enter(campaign_id);
/// // All tracing calls are now associated with this campaign_id
/// ```
pub struct CampaignSpan {
    _span: tracing::span::EnteredSpan,
}

impl CampaignSpan {
    /// Create and enter a span tagged with the campaign id.
    pub fn enter(campaign_id: Uuid) -> Self {
        let span = tracing::info_span!("sweepgate.campaign", campaign_id = %campaign_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: campaign started with batch and candidate counts.
pub fn emit_campaign_started(campaign_id: Uuid, batches: usize, candidates: usize) {
    info!(
        event = "campaign.started",
        campaign_id = %campaign_id,
        batches = batches,
        candidates = candidates,
    );
}

/// Emit event: campaign reached a terminal status.
pub fn emit_campaign_finished(campaign_id: Uuid, status: &str, files_processed: usize) {
    info!(
        event = "campaign.finished",
        campaign_id = %campaign_id,
        status = %status,
        files_processed = files_processed,
    );
}

/// Emit event: batch started processing.
pub fn emit_batch_started(batch_id: Uuid, tier: &str, files: usize) {
    info!(event = "batch.started", batch_id = %batch_id, tier = %tier, files = files);
}

/// Emit event: batch validation completed with verdict.
pub fn emit_batch_validated(batch_id: Uuid, passed: bool, duration_ms: u64) {
    info!(
        event = "batch.validated",
        batch_id = %batch_id,
        passed = passed,
        duration_ms = duration_ms,
    );
}

/// Emit event: checkpoint creation failed, batch continues unprotected.
pub fn emit_checkpoint_degraded(batch_id: Uuid, error: &dyn std::fmt::Display) {
    warn!(event = "checkpoint.degraded", batch_id = %batch_id, error = %error);
}

/// Emit event: workspace restored to the pre-batch checkpoint.
pub fn emit_rollback_performed(batch_id: Uuid, stash_ref: Option<&str>) {
    info!(
        event = "rollback.performed",
        batch_id = %batch_id,
        stash_ref = stash_ref.unwrap_or("<clean-tree>"),
    );
}
