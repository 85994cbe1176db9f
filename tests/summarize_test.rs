//! Integration tests for the correction rules and the rule-based path.

mod common;

use common::analysis;

use changescribe::classify::ChangeCategory;
use changescribe::ingest::FileStatus;
use changescribe::summarize::{
    CommitProfile, Impact, Metrics, SummarySource, Summarizer, SummarizerConfig,
    parse_response, rule_based_summary, validate_commit_category, validate_impact_assessment,
};

fn profile(file_count: usize, insertions: usize, deletions: usize) -> CommitProfile {
    CommitProfile {
        file_count,
        insertions,
        deletions,
        ..Default::default()
    }
}

#[test]
fn test_large_fix_is_reclassified() {
    assert_eq!(
        validate_commit_category(ChangeCategory::Fix, &profile(15, 1500, 100)),
        ChangeCategory::Feature
    );
    assert_eq!(
        validate_commit_category(ChangeCategory::Fix, &profile(15, 1500, 1000)),
        ChangeCategory::Refactor
    );
}

#[test]
fn test_wide_low_impact_escalates_to_high() {
    assert_eq!(
        validate_impact_assessment(Impact::Low, &profile(60, 4000, 2000)),
        Impact::High
    );
}

#[test]
fn test_changelog_and_readme_only_is_low_docs() {
    let a = analysis(
        "update docs",
        &[
            ("CHANGELOG.md", FileStatus::Modified, "+## 1.0\n"),
            ("README.md", FileStatus::Modified, "+usage\n"),
        ],
    );
    let profile = CommitProfile::from_analysis(&a);
    assert!(profile.docs_only);
    assert_eq!(validate_impact_assessment(Impact::Critical, &profile), Impact::Low);
    assert_eq!(
        validate_commit_category(ChangeCategory::Feature, &profile),
        ChangeCategory::Docs
    );
}

#[test]
fn test_tests_only_change_is_test() {
    let a = analysis(
        "fix: flaky assertion",
        &[("tests/api_test.rs", FileStatus::Modified, "-assert!(a)\n+assert!(b)\n")],
    );
    let profile = CommitProfile::from_analysis(&a);
    assert_eq!(
        validate_commit_category(ChangeCategory::Fix, &profile),
        ChangeCategory::Test
    );
}

#[test]
fn test_fix_adding_source_module_is_feature() {
    let a = analysis(
        "fix: add retry helper",
        &[
            ("src/retry.rs", FileStatus::Added, "+pub fn retry() {}\n"),
            ("src/lib.rs", FileStatus::Modified, "+mod retry;\n"),
        ],
    );
    let profile = CommitProfile::from_analysis(&a);
    assert_eq!(profile.new_source_modules, 1);
    assert_eq!(
        validate_commit_category(ChangeCategory::Fix, &profile),
        ChangeCategory::Feature
    );
}

#[test]
fn test_rule_based_summary_is_complete() {
    let a = analysis(
        "perf: cache parsed config",
        &[("src/config.rs", FileStatus::Modified, "+let cache = HashMap::new();\n")],
    );
    let summary = rule_based_summary(&a);
    assert_eq!(summary.summary, "perf: cache parsed config (1 files changed)");
    assert_eq!(summary.category, ChangeCategory::Perf);
    assert_eq!(summary.source, SummarySource::RuleBased);
    assert!(!summary.technical_details.is_empty());
    assert!(!summary.description.is_empty());
}

#[tokio::test]
async fn test_summarizer_without_provider_never_fails() {
    let commits = [
        analysis("feat: add search", &[("src/search.rs", FileStatus::Added, "+pub fn search() {}\n")]),
        analysis("empty commit", &[]),
        analysis("docs: typo", &[("README.md", FileStatus::Modified, "-teh\n+the\n")]),
    ];

    let mut summarizer = Summarizer::new(None, SummarizerConfig::default());
    let mut metrics = Metrics::new();
    for commit in &commits {
        let summary = summarizer.summarize(commit, &mut metrics).await;
        assert_eq!(summary.source, SummarySource::RuleBased);
        assert!(!summary.summary.is_empty());
    }
    assert_eq!(metrics.ai_unavailable, 3);
    assert_eq!(metrics.rule_based_fallbacks, 0);
}

#[test]
fn test_malformed_response_degrades_to_text_sniffing() {
    let a = analysis("feat: add search", &[("src/search.rs", FileStatus::Added, "+x\n")]);
    let summary = parse_response(
        "This introduces breaking changes to search.\nImpact: critical",
        &a,
    );
    assert_eq!(summary.source, SummarySource::Ai);
    assert_eq!(summary.impact, Impact::Critical);
    assert!(summary.breaking_changes);
    assert_eq!(summary.summary, "This introduces breaking changes to search.");
}
