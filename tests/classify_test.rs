//! Integration tests for the deterministic classifiers.

use changescribe::classify::{
    FileCategory, Importance, RiskLevel, assess_change_complexity, assess_file_importance,
    assess_risk, categorize_file, classify_file, detect_language,
};
use changescribe::ingest::FileStatus;

const PATHS: &[&str] = &[
    "src/main.rs",
    "web/components/Button.tsx",
    "docs/guide.md",
    "Cargo.toml",
    "tests/api_test.py",
    ".github/workflows/ci.yml",
    "assets/logo.png",
];

#[test]
fn test_classifiers_are_idempotent() {
    let diff = "+fn a() {}\n-fn b() {}\n+let x = 1;\n";
    for path in PATHS {
        for status in [FileStatus::Added, FileStatus::Modified, FileStatus::Deleted] {
            assert_eq!(categorize_file(path), categorize_file(path));
            assert_eq!(detect_language(path), detect_language(path));
            assert_eq!(
                assess_file_importance(path, status),
                assess_file_importance(path, status)
            );
            assert_eq!(assess_change_complexity(diff), assess_change_complexity(diff));
            assert_eq!(classify_file(path, diff, status), classify_file(path, diff, status));
        }
    }
}

#[test]
fn test_expected_categories() {
    assert_eq!(categorize_file("src/main.rs"), FileCategory::Source);
    assert_eq!(categorize_file("docs/guide.md"), FileCategory::Documentation);
    assert_eq!(categorize_file("Cargo.toml"), FileCategory::Configuration);
    assert_eq!(categorize_file("tests/api_test.py"), FileCategory::Tests);
    assert_eq!(detect_language("web/components/Button.tsx"), "TypeScript (TSX)");
}

#[test]
fn test_manifest_is_critical_and_deletion_is_high() {
    assert_eq!(
        assess_file_importance("Cargo.toml", FileStatus::Modified),
        Importance::Critical
    );
    assert!(assess_file_importance("src/old.rs", FileStatus::Deleted) >= Importance::High);
}

#[test]
fn test_risk_escalation_is_monotonic() {
    let infra_diff = "diff --git a/Dockerfile b/Dockerfile\n+FROM rust:1\n";
    let big_diff = format!("{}{}", infra_diff, "+x\n".repeat(5_000));

    let none = assess_risk("+x\n", 1, "tidy up");
    let keyword = assess_risk("+x\n", 1, "remove legacy auth");
    let keyword_infra = assess_risk(infra_diff, 1, "remove legacy auth");
    let all = assess_risk(&big_diff, 20, "remove legacy auth");

    assert_eq!(none, RiskLevel::Low);
    assert!(keyword >= none);
    assert!(keyword_infra >= keyword);
    assert!(all >= keyword_infra);
    assert_eq!(all, RiskLevel::Critical);
}
