//! Campaign lifecycle against scripted collaborators: checkpointing,
//! validation verdicts, rollback, halt-on-failure, and review gating.

use std::path::Path;

use chrono::Utc;

use sweepgate_core::fakes::{FakeCommandRunner, RecordingEngine};
use sweepgate_core::{
    CampaignConfig, CampaignStatus, FileCandidate, ManualReviewQueue, Orchestrator, StateStore,
};

fn candidate(relative: &str, changes: usize) -> FileCandidate {
    let config = CampaignConfig::default();
    FileCandidate::new(
        Path::new("/repo"),
        relative,
        config.classify_path(relative),
        changes,
    )
}

// ── Clean run across tiers ──

#[tokio::test]
async fn multi_tier_campaign_validates_every_batch() {
    let config = CampaignConfig::default();
    let runner = FakeCommandRunner::new();
    runner.respond_ok("git stash create", "aaa111");
    runner.respond_ok("git stash create", "bbb222");
    let engine = RecordingEngine::new();
    let orchestrator =
        Orchestrator::new(&config, &runner, &engine, Path::new("/repo"), false).unwrap();
    let mut queue = ManualReviewQueue::new();

    let state = orchestrator
        .run(
            vec![
                candidate("src/utils/a.ts", 2),
                candidate("src/utils/b.ts", 3),
                candidate("src/services/api.ts", 4),
            ],
            &mut queue,
            6,
        )
        .await;

    assert_eq!(state.status, CampaignStatus::Completed);
    assert_eq!(state.batch_results.len(), 2);
    assert!(state.batch_results.iter().all(|r| r.succeeded()));
    assert_eq!(state.stats.files_processed, 3);
    assert_eq!(state.stats.changes_eliminated, 9);
    assert_eq!(state.stats.sites_preserved, 6);
    assert!((state.stats.success_rate - 1.0).abs() < f32::EPSILON);
    assert_eq!(engine.applied().len(), 2);

    // One checkpoint per batch, anchored by a stash store each time.
    let calls = runner.calls();
    let creates = calls.iter().filter(|c| c.starts_with("git stash create")).count();
    let stores = calls.iter().filter(|c| c.starts_with("git stash store")).count();
    assert_eq!(creates, 2);
    assert_eq!(stores, 2);
}

// ── Critical batch fails the build and is rolled back ──

#[tokio::test]
async fn failed_critical_batch_restores_checkpoint() {
    let config = CampaignConfig::default();
    let runner = FakeCommandRunner::new();
    runner.respond_ok("git stash create", "ccc333");
    runner.respond_fail("npx tsc", "TS2322: type mismatch in planetary.ts");
    let engine = RecordingEngine::new();
    let orchestrator =
        Orchestrator::new(&config, &runner, &engine, Path::new("/repo"), false).unwrap();
    let mut queue = ManualReviewQueue::new();

    // Five calculation files under the review threshold make exactly one
    // critical batch at the configured cap of five.
    let candidates: Vec<FileCandidate> = (0..5)
        .map(|i| candidate(&format!("src/calculations/c{i}.ts"), 4))
        .collect();
    let state = orchestrator.run(candidates, &mut queue, 0).await;

    assert_eq!(state.status, CampaignStatus::RolledBack);
    assert_eq!(state.batch_results.len(), 1);
    let result = &state.batch_results[0];
    assert!(!result.compilation_passed);
    assert!(result.rollback_performed);
    assert!(result.errors.iter().any(|e| e.contains("TS2322")));
    assert!(result.outcomes.iter().all(|o| !o.succeeded));
    assert_eq!(state.stats.changes_eliminated, 0);

    let calls = runner.calls();
    assert!(calls.contains(&"git reset --hard HEAD".to_string()));
    assert!(calls.contains(&"git stash apply ccc333".to_string()));
}

// ── First failure halts the campaign ──

#[tokio::test]
async fn later_batches_are_skipped_after_a_failure() {
    let config = CampaignConfig::default();
    let runner = FakeCommandRunner::new();
    runner.respond_ok("git stash create", "d1");
    runner.respond_ok("git stash create", "d2");
    runner.respond_ok("npx tsc", "");
    runner.respond_fail("npx tsc", "TS2304: cannot find name");
    let engine = RecordingEngine::new();
    let orchestrator =
        Orchestrator::new(&config, &runner, &engine, Path::new("/repo"), false).unwrap();
    let mut queue = ManualReviewQueue::new();

    let state = orchestrator
        .run(
            vec![candidate("src/utils/a.ts", 2), candidate("src/services/api.ts", 3)],
            &mut queue,
            0,
        )
        .await;

    // Low batch validated, high batch failed and rolled back, nothing more.
    assert_eq!(state.status, CampaignStatus::RolledBack);
    assert_eq!(state.batch_results.len(), 2);
    assert!(state.batch_results[0].succeeded());
    assert!(state.batch_results[1].rollback_performed);
    assert_eq!(engine.applied().len(), 2);
    assert_eq!(state.stats.files_processed, 2);
    assert_eq!(state.stats.changes_eliminated, 2);
    assert!((state.stats.success_rate - 0.5).abs() < f32::EPSILON);
}

// ── Review gating across persisted state ──

#[tokio::test]
async fn approval_between_runs_unlocks_the_candidate() {
    let workspace = tempfile::tempdir().unwrap();
    let config = CampaignConfig::default();
    let runner = FakeCommandRunner::new();
    let engine = RecordingEngine::new();
    let orchestrator =
        Orchestrator::new(&config, &runner, &engine, workspace.path(), false).unwrap();
    let store = StateStore::at_workspace(workspace.path());

    // First run diverts the flagged file and persists the queue.
    let mut queue = store.load_reviews().unwrap();
    let state = orchestrator
        .run(vec![candidate("src/calculations/core.ts", 30)], &mut queue, 0)
        .await;
    store.save_reviews(&queue).unwrap();
    assert_eq!(state.status, CampaignStatus::Completed);
    assert!(engine.applied().is_empty());
    assert_eq!(state.pending_reviews.len(), 1);

    // A separate invocation approves it.
    let mut queue = store.load_reviews().unwrap();
    assert_eq!(queue.pending().len(), 1);
    assert!(queue.approve("src/calculations/core.ts", Some("reviewed the diff".into()), Utc::now()));
    store.save_reviews(&queue).unwrap();

    // Second run processes the file.
    let mut queue = store.load_reviews().unwrap();
    let state = orchestrator
        .run(vec![candidate("src/calculations/core.ts", 30)], &mut queue, 0)
        .await;
    assert_eq!(state.status, CampaignStatus::Completed);
    assert_eq!(engine.applied().len(), 1);
    assert!(state.pending_reviews.is_empty());
}

#[tokio::test]
async fn rejected_candidate_stays_out_of_batches() {
    let config = CampaignConfig::default();
    let runner = FakeCommandRunner::new();
    let engine = RecordingEngine::new();
    let orchestrator =
        Orchestrator::new(&config, &runner, &engine, Path::new("/repo"), false).unwrap();
    let mut queue = ManualReviewQueue::new();

    orchestrator
        .run(vec![candidate("src/calculations/core.ts", 30)], &mut queue, 0)
        .await;
    assert!(queue.reject(
        "src/calculations/core.ts",
        Some("hold until after the release".into()),
        Utc::now(),
    ));

    // The file is flagged again on the next run and still not processed.
    let state = orchestrator
        .run(vec![candidate("src/calculations/core.ts", 30)], &mut queue, 0)
        .await;
    assert!(engine.applied().is_empty());
    assert_eq!(state.pending_reviews.len(), 1);
}

// ── Campaign artifact survives the run ──

#[tokio::test]
async fn campaign_state_roundtrips_through_the_store() {
    let workspace = tempfile::tempdir().unwrap();
    let config = CampaignConfig::default();
    let runner = FakeCommandRunner::new();
    let engine = RecordingEngine::new();
    let orchestrator =
        Orchestrator::new(&config, &runner, &engine, workspace.path(), false).unwrap();
    let mut queue = ManualReviewQueue::new();

    let state = orchestrator
        .run(vec![candidate("src/utils/a.ts", 2)], &mut queue, 1)
        .await;

    let store = StateStore::at_workspace(workspace.path());
    store.save_campaign(&state).unwrap();
    let loaded = store.load_campaign().unwrap();
    assert_eq!(state, loaded);
    assert_eq!(loaded.status, CampaignStatus::Completed);

    let md = sweepgate_core::render_campaign_md(&loaded);
    assert!(md.contains("- status: completed"));
    assert!(md.contains("- files processed: 1"));
}
