//! Plan and campaign report artifacts: pretty JSON for machines, rendered
//! Markdown for humans.

use std::path::Path;

use crate::domain::{CampaignState, Result};
use crate::planner::ProcessingPlan;

/// Write the machine-readable plan as pretty JSON.
pub fn write_plan_json(path: &Path, plan: &ProcessingPlan) -> Result<()> {
    let content = serde_json::to_string_pretty(plan)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write the post-campaign report as pretty JSON.
pub fn write_campaign_json(path: &Path, state: &CampaignState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Render a plan summary for PR/terminal output.
pub fn render_plan_md(plan: &ProcessingPlan) -> String {
    let mut out = String::new();
    out.push_str("# Processing Plan\n\n");
    out.push_str(&format!(
        "- estimated batches: {}\n- automatic candidates: {}\n- manual review required: {}\n\n",
        plan.estimated_batches,
        plan.auto_candidates(),
        plan.manual_review.len()
    ));

    if !plan.batches.is_empty() {
        out.push_str("## Batches\n");
        for (idx, batch) in plan.batches.iter().enumerate() {
            out.push_str(&format!(
                "- batch {}: {}, {} files, {} proposed changes\n",
                idx + 1,
                batch.tier,
                batch.len(),
                batch.proposed_changes()
            ));
        }
        out.push('\n');
    }

    if !plan.manual_review.is_empty() {
        out.push_str("## Manual Review\n");
        for candidate in &plan.manual_review {
            let tier = plan
                .assessments
                .get(&candidate.relative_path)
                .map(|a| a.tier.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            out.push_str(&format!(
                "- `{}` ({tier}): {} proposed changes\n",
                candidate.relative_path, candidate.proposed_changes
            ));
        }
    }
    out
}

/// Render a campaign summary for PR/terminal output.
pub fn render_campaign_md(state: &CampaignState) -> String {
    let mut out = String::new();
    out.push_str("# Campaign Report\n\n");
    out.push_str(&format!(
        "- status: {}\n- started: {}\n",
        state.status,
        state.started_at.to_rfc3339()
    ));
    if let Some(finished) = state.finished_at {
        out.push_str(&format!("- finished: {}\n", finished.to_rfc3339()));
    }
    out.push_str(&format!(
        "- files processed: {}\n- changes eliminated: {}\n- sites preserved: {}\n- success rate: {:.1}%\n\n",
        state.stats.files_processed,
        state.stats.changes_eliminated,
        state.stats.sites_preserved,
        state.stats.success_rate * 100.0
    ));

    if !state.batch_results.is_empty() {
        out.push_str("## Batches\n");
        for (idx, result) in state.batch_results.iter().enumerate() {
            let verdict = if result.succeeded() {
                "validated"
            } else if result.rollback_performed {
                "rolled back"
            } else {
                "failed"
            };
            out.push_str(&format!(
                "- batch {} ({}): {} files, {verdict}, {} ms\n",
                idx + 1,
                result.tier,
                result.outcomes.len(),
                result.processing_time_ms
            ));
            for error in &result.errors {
                out.push_str(&format!("  - error: {error}\n"));
            }
            for warning in &result.warnings {
                out.push_str(&format!("  - warning: {warning}\n"));
            }
        }
        out.push('\n');
    }

    if !state.pending_reviews.is_empty() {
        out.push_str("## Pending Reviews\n");
        for request in &state.pending_reviews {
            out.push_str(&format!(
                "- `{}` ({})\n",
                request.candidate.relative_path, request.assessment.tier
            ));
        }
    }
    out
}
