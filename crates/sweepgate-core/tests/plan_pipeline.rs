//! End-to-end planning pipeline: analysis report → candidates → risk
//! assessment → size-bounded, risk-ordered batches.

use std::collections::HashSet;
use std::path::Path;

use sweepgate_core::ingest::{AnalysisReport, ReportEntry, SiteVerdict};
use sweepgate_core::{BatchPlanner, CampaignConfig, FileCategory, RiskAssessor, RiskTier};

fn entries(file: &str, count: usize) -> Vec<ReportEntry> {
    (0..count)
        .map(|i| ReportEntry {
            file: file.to_string(),
            symbol: Some(format!("unused{i}")),
            line: Some(i as u32 + 1),
            verdict: SiteVerdict::Eliminate,
            reason: None,
        })
        .collect()
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

// ── Scenario assessments through the full pipeline ──

#[test]
fn calculation_file_with_many_changes_needs_review() {
    let workspace = tempfile::tempdir().unwrap();
    write_file(workspace.path(), "src/calculations/planetary.ts", "const x = 1;\n");
    let config = CampaignConfig::default();
    let report = AnalysisReport {
        entries: entries("src/calculations/planetary.ts", 25),
    };

    let candidates = report.into_candidates(workspace.path(), &config);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].category, FileCategory::Calculation);
    assert_eq!(candidates[0].proposed_changes, 25);

    let assessor = RiskAssessor::new(&config).unwrap();
    let planner = BatchPlanner::new(&assessor, &config);
    let plan = planner.plan(candidates, &HashSet::new());

    assert!(plan.batches.is_empty());
    assert_eq!(plan.manual_review.len(), 1);
    let assessment = &plan.assessments["src/calculations/planetary.ts"];
    assert_eq!(assessment.tier, RiskTier::Critical);
    assert!(assessment.requires_manual_review);
    assert_eq!(assessment.recommended_batch_size, 5);
}

#[test]
fn service_file_is_high_tier_with_enhanced_validation() {
    let workspace = tempfile::tempdir().unwrap();
    write_file(workspace.path(), "src/services/astrologyApi.ts", "export const api = {};\n");
    let config = CampaignConfig::default();
    let report = AnalysisReport {
        entries: entries("src/services/astrologyApi.ts", 10),
    };

    let assessor = RiskAssessor::new(&config).unwrap();
    let planner = BatchPlanner::new(&assessor, &config);
    let plan = planner.plan(
        report.into_candidates(workspace.path(), &config),
        &HashSet::new(),
    );

    assert_eq!(plan.estimated_batches, 1);
    assert_eq!(plan.batches[0].tier, RiskTier::High);
    let assessment = &plan.assessments["src/services/astrologyApi.ts"];
    assert!(!assessment.requires_manual_review);
    assert!(assessment.requires_enhanced_validation);
    assert_eq!(assessment.recommended_batch_size, 8);
}

#[test]
fn utility_file_is_low_tier() {
    let workspace = tempfile::tempdir().unwrap();
    write_file(workspace.path(), "src/utils/format.ts", "const pad = 2;\n");
    let config = CampaignConfig::default();
    let report = AnalysisReport {
        entries: entries("src/utils/format.ts", 3),
    };

    let assessor = RiskAssessor::new(&config).unwrap();
    let planner = BatchPlanner::new(&assessor, &config);
    let plan = planner.plan(
        report.into_candidates(workspace.path(), &config),
        &HashSet::new(),
    );

    let assessment = &plan.assessments["src/utils/format.ts"];
    assert_eq!(assessment.tier, RiskTier::Low);
    assert!(!assessment.requires_manual_review);
    assert_eq!(assessment.recommended_batch_size, 15);
}

// ── Batch bounds and ordering ──

#[test]
fn every_batch_stays_within_its_tier_maximum() {
    let workspace = tempfile::tempdir().unwrap();
    let config = CampaignConfig::default();
    let mut report = AnalysisReport { entries: vec![] };
    for i in 0..40 {
        let file = format!("src/utils/f{i:02}.ts");
        write_file(workspace.path(), &file, "const x = 1;\n");
        report.entries.extend(entries(&file, 1));
    }

    let assessor = RiskAssessor::new(&config).unwrap();
    let planner = BatchPlanner::new(&assessor, &config);
    let plan = planner.plan(
        report.into_candidates(workspace.path(), &config),
        &HashSet::new(),
    );

    assert_eq!(plan.estimated_batches, 3);
    for batch in &plan.batches {
        assert!(batch.len() <= config.batch_sizes.for_tier(batch.tier));
        assert_eq!(batch.tier, RiskTier::Low);
    }
    assert_eq!(plan.auto_candidates(), 40);
}

#[test]
fn batches_are_ordered_safest_first_without_mixing_tiers() {
    let workspace = tempfile::tempdir().unwrap();
    let config = CampaignConfig::default();
    let mut report = AnalysisReport { entries: vec![] };
    for (file, count) in [
        ("src/services/api.ts", 4),
        ("src/utils/a.ts", 1),
        ("src/components/Widget.tsx", 2),
        ("src/services/auth.ts", 3),
    ] {
        write_file(workspace.path(), file, "export const x = 1;\n");
        report.entries.extend(entries(file, count));
    }

    let assessor = RiskAssessor::new(&config).unwrap();
    let planner = BatchPlanner::new(&assessor, &config);
    let plan = planner.plan(
        report.into_candidates(workspace.path(), &config),
        &HashSet::new(),
    );

    let tiers: Vec<RiskTier> = plan.batches.iter().map(|b| b.tier).collect();
    let mut sorted = tiers.clone();
    sorted.sort();
    assert_eq!(tiers, sorted, "batches must ascend by tier");
    for batch in &plan.batches {
        for candidate in &batch.candidates {
            assert_eq!(plan.assessments[&candidate.relative_path].tier, batch.tier);
        }
    }
}

// ── Content scan feeds the plan ──

#[test]
fn keyword_match_adds_factors_and_enhanced_validation() {
    let workspace = tempfile::tempdir().unwrap();
    write_file(
        workspace.path(),
        "src/utils/balance.ts",
        "export function calculateElementalBalance() { return 0; }\n",
    );
    let config = CampaignConfig::default();
    let report = AnalysisReport {
        entries: entries("src/utils/balance.ts", 2),
    };

    let assessor = RiskAssessor::new(&config).unwrap();
    let planner = BatchPlanner::new(&assessor, &config);
    let plan = planner.plan(
        report.into_candidates(workspace.path(), &config),
        &HashSet::new(),
    );

    let assessment = &plan.assessments["src/utils/balance.ts"];
    // Path says utility, content says calculation logic: the tier stays
    // low but the batch gets enhanced validation.
    assert_eq!(assessment.tier, RiskTier::Low);
    assert!(assessment.requires_enhanced_validation);
    assert!(assessment
        .risk_factors
        .iter()
        .any(|f| f.contains("core calculation logic")));
    assert!(!assessment.mitigation_strategies.is_empty());
}

// ── Report bookkeeping ──

#[test]
fn preserved_sites_are_counted_not_batched() {
    let workspace = tempfile::tempdir().unwrap();
    let config = CampaignConfig::default();
    let mut report = AnalysisReport {
        entries: entries("src/utils/a.ts", 2),
    };
    report.entries.push(ReportEntry {
        file: "src/calculations/core.ts".into(),
        symbol: Some("computeBalance".into()),
        line: Some(10),
        verdict: SiteVerdict::Preserve,
        reason: Some("public API".into()),
    });

    assert_eq!(report.preserved_count(), 1);
    write_file(workspace.path(), "src/utils/a.ts", "const x = 1;\n");
    let candidates = report.into_candidates(workspace.path(), &config);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].relative_path, "src/utils/a.ts");
}

#[test]
fn raw_json_report_flows_to_plan() {
    let workspace = tempfile::tempdir().unwrap();
    write_file(workspace.path(), "src/utils/a.ts", "const x = 1;\n");
    let raw = r#"{
        "entries": [
            {"file": "src/utils/a.ts", "symbol": "unused", "line": 3, "verdict": "eliminate"},
            {"file": "src/utils/a.ts", "verdict": "eliminate"},
            {"file": "src/index.ts", "verdict": "preserve", "reason": "entry point"}
        ]
    }"#;
    let report = sweepgate_core::parse_report(raw).unwrap();
    let config = CampaignConfig::default();
    let candidates = report.into_candidates(workspace.path(), &config);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].proposed_changes, 2);

    let assessor = RiskAssessor::new(&config).unwrap();
    let planner = BatchPlanner::new(&assessor, &config);
    let plan = planner.plan(candidates, &HashSet::new());
    assert_eq!(plan.estimated_batches, 1);
}
