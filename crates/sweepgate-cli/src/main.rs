//! Sweepgate - campaign safety CLI for bulk code transformations
//!
//! The `sweepgate` command plans and executes risk-tiered transformation
//! campaigns over a git working tree.
//!
//! ## Commands
//!
//! - `plan`: Assess an analysis report and print the batch plan
//! - `execute`: Run a campaign with checkpointing, validation and rollback
//! - `review`: List, approve or reject manual-review requests
//! - `status`: Summarise the persisted campaign state

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use sweepgate_core::{
    capture_head_sha, is_dirty, is_git_repo, load_report, render_campaign_md, render_plan_md,
    write_plan_json, BatchPlanner, CampaignConfig, CampaignSpan, CampaignStatus, CommandEngine,
    NoopEngine, Orchestrator, ProcessRunner, ReviewStatus, RiskAssessor, StateStore,
    TransformEngine,
};

#[derive(Parser)]
#[command(name = "sweepgate")]
#[command(author = "Sweepgate Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Campaign safety for bulk code transformations", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Workspace root containing the files under transformation
    #[arg(long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// Directory for campaign artifacts (default: <workspace>/.sweepgate)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Flag candidates above this many proposed changes for manual review
    #[arg(long, global = true)]
    manual_review_threshold: Option<usize>,

    /// Maximum files per low-risk batch
    #[arg(long, global = true)]
    low_batch_size: Option<usize>,

    /// Maximum files per medium-risk batch
    #[arg(long, global = true)]
    medium_batch_size: Option<usize>,

    /// Maximum files per high-risk batch
    #[arg(long, global = true)]
    high_batch_size: Option<usize>,

    /// Maximum files per critical-risk batch
    #[arg(long, global = true)]
    critical_batch_size: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess an analysis report and print the processing plan
    Plan {
        /// Path to the JSON analysis report
        #[arg(short, long)]
        report: PathBuf,

        /// Print the plan as JSON instead of Markdown
        #[arg(long)]
        json: bool,

        /// Also write the plan JSON to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run a transformation campaign over the workspace
    Execute {
        /// Path to the JSON analysis report
        #[arg(short, long)]
        report: PathBuf,

        /// Plan and validate without touching the working tree
        #[arg(long)]
        dry_run: bool,

        /// Skip git checkpoints before each batch
        #[arg(long)]
        no_snapshot: bool,

        /// Skip checkpoint restore when a batch fails validation
        #[arg(long)]
        no_rollback: bool,

        /// Skip per-category content checks after the build step
        #[arg(long)]
        no_enhanced_validation: bool,

        /// Process flagged candidates without manual approval
        #[arg(long)]
        no_manual_review: bool,

        /// External transform command; batch file paths are appended
        #[arg(long)]
        apply_cmd: Option<String>,
    },

    /// Manage manual-review requests
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Summarise the persisted campaign state
    Status,
}

#[derive(Subcommand)]
enum ReviewAction {
    /// List pending and resolved requests
    List,

    /// Approve a pending request
    Approve {
        /// Workspace-relative path of the candidate
        path: String,

        /// Reviewer notes to record with the approval
        #[arg(long)]
        notes: Option<String>,
    },

    /// Reject a pending request
    Reject {
        /// Workspace-relative path of the candidate
        path: String,

        /// Why the candidate must not be processed
        #[arg(long)]
        reason: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    sweepgate_core::init_tracing(cli.json_logs, level);

    let config = load_config(&cli)?;
    let store = match &cli.state_dir {
        Some(dir) => StateStore::new(dir.clone()),
        None => StateStore::at_workspace(&cli.workspace),
    };

    match cli.command {
        Commands::Plan { report, json, out } => {
            cmd_plan(&config, &cli.workspace, &store, &report, json, out.as_deref())
        }
        Commands::Execute {
            report,
            dry_run,
            no_snapshot,
            no_rollback,
            no_enhanced_validation,
            no_manual_review,
            apply_cmd,
        } => {
            cmd_execute(
                &config,
                &cli.workspace,
                &store,
                &report,
                dry_run,
                no_snapshot,
                no_rollback,
                no_enhanced_validation,
                no_manual_review,
                apply_cmd.as_deref(),
            )
            .await
        }
        Commands::Review { action } => match action {
            ReviewAction::List => cmd_review_list(&store),
            ReviewAction::Approve { path, notes } => cmd_review_approve(&store, &path, notes),
            ReviewAction::Reject { path, reason } => cmd_review_reject(&store, &path, reason),
        },
        Commands::Status => cmd_status(&store),
    }
}

/// Load configuration and fold in command-line overrides.
fn load_config(cli: &Cli) -> Result<CampaignConfig> {
    let mut config = match &cli.config {
        Some(path) => CampaignConfig::from_toml_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => CampaignConfig::default(),
    };

    if let Some(threshold) = cli.manual_review_threshold {
        config.manual_review_threshold = threshold;
    }
    if let Some(size) = cli.low_batch_size {
        config.batch_sizes.low = size;
    }
    if let Some(size) = cli.medium_batch_size {
        config.batch_sizes.medium = size;
    }
    if let Some(size) = cli.high_batch_size {
        config.batch_sizes.high = size;
    }
    if let Some(size) = cli.critical_batch_size {
        config.batch_sizes.critical = size;
    }

    config.validate()?;
    Ok(config)
}

/// Split a raw `--apply-cmd` string into argv form.
fn split_command(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(String::from).collect()
}

/// Assess an analysis report and print the processing plan
fn cmd_plan(
    config: &CampaignConfig,
    workspace: &Path,
    store: &StateStore,
    report_path: &Path,
    json: bool,
    out: Option<&Path>,
) -> Result<()> {
    let report = load_report(report_path)
        .with_context(|| format!("failed to load analysis report {}", report_path.display()))?;
    let preserved = report.preserved_count();
    let candidates = report.into_candidates(workspace, config);
    info!(
        "assessing {} candidate files ({} sites preserved)",
        candidates.len(),
        preserved
    );

    let assessor = RiskAssessor::new(config)?;
    let queue = store.load_reviews()?;
    let plan = BatchPlanner::new(&assessor, config).plan(candidates, &queue.approved_paths());

    if let Some(path) = out {
        write_plan_json(path, &plan)?;
        info!("plan written to {:?}", path);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{}", render_plan_md(&plan));
    }

    Ok(())
}

/// Run a transformation campaign over the workspace
async fn cmd_execute(
    config: &CampaignConfig,
    workspace: &Path,
    store: &StateStore,
    report_path: &Path,
    dry_run: bool,
    no_snapshot: bool,
    no_rollback: bool,
    no_enhanced_validation: bool,
    no_manual_review: bool,
    apply_cmd: Option<&str>,
) -> Result<()> {
    if apply_cmd.is_none() && !dry_run {
        anyhow::bail!("--apply-cmd is required unless --dry-run is set");
    }

    let mut config = config.clone();
    if no_snapshot {
        config.features.snapshots = false;
    }
    if no_rollback {
        config.features.rollback = false;
    }
    if no_enhanced_validation {
        config.features.enhanced_validation = false;
    }
    if no_manual_review {
        config.features.manual_review = false;
    }

    let report = load_report(report_path)
        .with_context(|| format!("failed to load analysis report {}", report_path.display()))?;
    let preserved = report.preserved_count();
    let candidates = report.into_candidates(workspace, &config);

    let runner = ProcessRunner;

    // Preflight: without a git repository there is no rollback cover.
    if is_git_repo(&runner, workspace).await {
        let head = capture_head_sha(&runner, workspace).await?;
        info!("workspace at commit {}", head.get(..12).unwrap_or(&head));
        if is_dirty(&runner, workspace).await? {
            warn!("working tree has uncommitted changes; checkpoints will carry them");
        }
    } else if dry_run {
        info!("workspace is not a git repository (ignored for a dry run)");
    } else {
        warn!("workspace is not a git repository; batches will run without rollback cover");
    }

    let noop = NoopEngine;
    let command_engine;
    let engine: &dyn TransformEngine = match apply_cmd {
        Some(raw) if !dry_run => {
            command_engine = CommandEngine::new(&runner, split_command(raw), None);
            &command_engine
        }
        _ => &noop,
    };

    let orchestrator = Orchestrator::new(&config, &runner, engine, workspace, dry_run)?;
    let mut queue = store.load_reviews()?;

    println!(
        "Executing campaign over {:?}: {} candidate files{}",
        workspace,
        candidates.len(),
        if dry_run { " (dry run)" } else { "" }
    );
    println!();

    let state = orchestrator.run(candidates, &mut queue, preserved).await;

    let _span = CampaignSpan::enter(state.campaign_id);
    store.save_campaign(&state)?;
    store.save_reviews(&queue)?;
    info!("campaign artifacts written to {:?}", store.dir());

    println!("{}", render_campaign_md(&state));

    if !state.pending_reviews.is_empty() {
        println!(
            "{} candidate(s) await manual review: run `sweepgate review list`",
            state.pending_reviews.len()
        );
    }

    match state.status {
        CampaignStatus::Completed => {
            println!("✓ Campaign completed");
            Ok(())
        }
        status => anyhow::bail!("campaign halted: {status}"),
    }
}

/// List pending and resolved manual-review requests
fn cmd_review_list(store: &StateStore) -> Result<()> {
    let queue = store.load_reviews()?;
    if queue.is_empty() {
        println!("No manual-review requests recorded");
        return Ok(());
    }

    if !queue.pending().is_empty() {
        println!("Pending:");
        for request in queue.pending() {
            println!(
                "  {} [{}] {} proposed changes{}",
                request.candidate.relative_path,
                request.assessment.tier,
                request.candidate.proposed_changes,
                if request.approval_required {
                    " (approval required)"
                } else {
                    ""
                },
            );
            for line in &request.instructions {
                println!("    - {line}");
            }
        }
    }

    if !queue.resolved().is_empty() {
        println!("Resolved:");
        for request in queue.resolved() {
            let verdict = match request.status {
                ReviewStatus::Approved => "approved",
                ReviewStatus::Rejected => "rejected",
                ReviewStatus::Pending => "pending",
            };
            match &request.notes {
                Some(notes) => println!(
                    "  {} ({verdict}: {notes})",
                    request.candidate.relative_path
                ),
                None => println!("  {} ({verdict})", request.candidate.relative_path),
            }
        }
    }

    Ok(())
}

/// Approve a pending request so the candidate can enter automatic batches
fn cmd_review_approve(store: &StateStore, path: &str, notes: Option<String>) -> Result<()> {
    let mut queue = store.load_reviews()?;
    if queue.approve(path, notes, Utc::now()) {
        store.save_reviews(&queue)?;
        println!("✓ Approved {path}");
    } else {
        println!("No pending review request for {path}");
    }
    Ok(())
}

/// Reject a pending request, keeping the candidate out of the campaign
fn cmd_review_reject(store: &StateStore, path: &str, reason: String) -> Result<()> {
    let mut queue = store.load_reviews()?;
    if queue.reject(path, Some(reason), Utc::now()) {
        store.save_reviews(&queue)?;
        println!("✗ Rejected {path}");
    } else {
        println!("No pending review request for {path}");
    }
    Ok(())
}

/// Summarise the persisted campaign state
fn cmd_status(store: &StateStore) -> Result<()> {
    if !store.has_campaign() {
        println!("No campaign recorded under {:?}", store.dir());
        return Ok(());
    }

    let state = store
        .load_campaign()
        .context("stored campaign failed digest verification")?;
    println!("{}", render_campaign_md(&state));

    let queue = store.load_reviews()?;
    if !queue.pending().is_empty() {
        println!(
            "{} request(s) awaiting review: run `sweepgate review list`",
            queue.pending().len()
        );
    }

    Ok(())
}
