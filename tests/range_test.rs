//! Integration tests for commit range resolution and discovery.
//!
//! Uses temporary git repositories built with git2.

mod common;

use common::TestRepo;
use changescribe::git::{discover_commits, resolve_range};

#[test]
fn test_resolve_range_with_explicit_from_to() {
    let test_repo = TestRepo::new();

    let commit1 = test_repo.commit("feat: first commit");
    let _commit2 = test_repo.commit("feat: second commit");
    let commit3 = test_repo.commit("feat: third commit");

    let range = resolve_range(
        &test_repo.repo,
        Some(&commit1.to_string()),
        Some(&commit3.to_string()),
    )
    .expect("Failed to resolve range");

    assert_eq!(range.from, Some(commit1));
    assert_eq!(range.to, commit3);
    assert_eq!(range.from_ref, commit1.to_string());
}

#[test]
fn test_discovery_is_newest_first_and_excludes_from() {
    let test_repo = TestRepo::new();

    let commit1 = test_repo.commit("feat: first commit");
    let commit2 = test_repo.commit("fix: second commit");
    let commit3 = test_repo.commit("docs: third commit");

    let range = resolve_range(&test_repo.repo, Some(&commit1.to_string()), None).unwrap();
    let commits = discover_commits(&test_repo.repo, &range).unwrap();

    let hashes: Vec<String> = commits.iter().map(|c| c.hash.clone()).collect();
    assert_eq!(hashes, vec![commit3.to_string(), commit2.to_string()]);
    assert_eq!(commits[0].subject, "docs: third commit");
    assert_eq!(commits[0].parent_count, 1);
}

#[test]
fn test_default_range_starts_after_latest_release_tag() {
    let test_repo = TestRepo::new();

    let tagged = test_repo.commit("feat: released");
    test_repo.tag("v1.0.0", tagged);
    let after = test_repo.commit("fix: after release");

    let range = resolve_range(&test_repo.repo, None, None).unwrap();
    assert_eq!(range.from_ref, "v1.0.0");

    let commits = discover_commits(&test_repo.repo, &range).unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].hash, after.to_string());
}

#[test]
fn test_default_range_without_tags_covers_history() {
    let test_repo = TestRepo::new();

    test_repo.commit("feat: root commit");
    test_repo.commit("feat: second");

    let range = resolve_range(&test_repo.repo, None, None).unwrap();
    assert_eq!(range.from, None);
    assert_eq!(range.from_ref, "root");
    assert_eq!(discover_commits(&test_repo.repo, &range).unwrap().len(), 2);
}

#[test]
fn test_files_land_in_commits() {
    let test_repo = TestRepo::new();
    test_repo.commit_files(
        "feat: add module",
        &[("src/lib.rs", "pub mod a;\n"), ("src/a.rs", "pub fn a() {}\n")],
    );
    let head = test_repo.repo.head().unwrap().peel_to_commit().unwrap();
    let tree = head.tree().unwrap();
    assert!(tree.get_path(std::path::Path::new("src/a.rs")).is_ok());
    assert!(test_repo.path().join("src/lib.rs").exists());
}
