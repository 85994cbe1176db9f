//! Integration tests for commit and working-tree ingestion against a scripted
//! git runner.

mod common;

use common::{ScriptedRunner, file_diff_args, metadata_args, metadata_output};

use changescribe::ingest::file::{DELETED_PLACEHOLDER, UNAVAILABLE_PLACEHOLDER};
use changescribe::ingest::{FileStatus, analyze_commit, analyze_working_tree};
use changescribe::pipeline::summarize_commits;
use changescribe::summarize::{Metrics, Summarizer, SummarizerConfig, SummarySource};

const HASH: &str = "1111111111111111111111111111111111111111";

fn ten_file_commit() -> ScriptedRunner {
    let paths: Vec<String> = (0..10).map(|i| format!("src/module_{i}.rs")).collect();
    let name_status: String = paths.iter().map(|p| format!("M\t{p}\n")).collect();

    let mut runner = ScriptedRunner::new()
        .ok(&metadata_args(HASH), &metadata_output(HASH, &["p0"], "refactor: split modules"))
        .ok(&format!("show --name-status -M --format= {HASH}"), &name_status)
        .ok(
            &format!("show --shortstat --format= {HASH}"),
            " 10 files changed, 18 insertions(+), 9 deletions(-)\n",
        );

    for (i, path) in paths.iter().enumerate() {
        if i == 4 {
            runner = runner.fail(&file_diff_args(HASH, path), "fatal: unable to read blob");
        } else {
            runner = runner.ok(&file_diff_args(HASH, path), "@@ -1 +1,2 @@\n-old\n+new\n+more\n");
        }
    }
    runner
}

#[tokio::test]
async fn test_one_failed_file_still_yields_every_entry() {
    let runner = ten_file_commit();
    let analysis = analyze_commit(&runner, HASH).await.expect("commit should resolve");

    assert_eq!(analysis.files.len(), 10);
    let placeholders: Vec<_> = analysis
        .files
        .iter()
        .filter(|f| f.diff == UNAVAILABLE_PLACEHOLDER)
        .collect();
    assert_eq!(placeholders.len(), 1);
    assert_eq!(placeholders[0].path, "src/module_4.rs");

    assert_eq!(analysis.diff_stats.files, 10);
    assert_eq!(analysis.diff_stats.insertions, 18);
    assert_eq!(analysis.subject, "refactor: split modules");
    assert!(!analysis.merge_commit);
}

#[tokio::test]
async fn test_unresolvable_commit_is_none() {
    let runner = ScriptedRunner::new().fail(&metadata_args("deadbeef"), "fatal: bad object deadbeef");
    assert!(analyze_commit(&runner, "deadbeef").await.is_none());
}

#[tokio::test]
async fn test_deleted_file_gets_placeholder_and_previous_content() {
    let runner = ScriptedRunner::new()
        .ok(&metadata_args(HASH), &metadata_output(HASH, &["p0"], "chore: drop legacy"))
        .ok(&format!("show --name-status -M --format= {HASH}"), "D\tlegacy.txt\n")
        .ok(&file_diff_args(HASH, "legacy.txt"), "")
        .ok(&format!("show {HASH}^:legacy.txt"), "one\ntwo\nthree\n");

    let analysis = analyze_commit(&runner, HASH).await.unwrap();
    let file = &analysis.files[0];
    assert_eq!(file.status, FileStatus::Deleted);
    assert_eq!(file.diff, DELETED_PLACEHOLDER);
    assert_eq!(file.deletions, 3);
    assert_eq!(file.before_content.as_deref(), Some("one\ntwo\nthree\n"));
}

#[tokio::test]
async fn test_added_file_with_empty_diff_uses_preview() {
    let runner = ScriptedRunner::new()
        .ok(&metadata_args(HASH), &metadata_output(HASH, &["p0"], "feat: add notes"))
        .ok(&format!("show --name-status -M --format= {HASH}"), "A\tnotes.txt\n")
        .ok(&file_diff_args(HASH, "notes.txt"), "")
        .ok(&format!("show {HASH}:notes.txt"), "alpha\nbeta\n");

    let analysis = analyze_commit(&runner, HASH).await.unwrap();
    let file = &analysis.files[0];
    assert_eq!(file.status, FileStatus::Added);
    assert!(file.diff.starts_with("New file (2 lines)"));
    assert!(file.diff.contains("+alpha"));
    assert_eq!(file.additions, 2);
}

#[tokio::test]
async fn test_batch_skips_bad_commit_and_continues() {
    let runner = ten_file_commit().fail(&metadata_args("bad"), "fatal: bad object");
    let hashes = vec!["bad".to_string(), HASH.to_string()];

    let mut summarizer = Summarizer::new(None, SummarizerConfig::default());
    let mut metrics = Metrics::new();
    let out = summarize_commits(&runner, &hashes, &mut summarizer, &mut metrics).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].analysis.hash, HASH);
    assert_eq!(out[0].summary.source, SummarySource::RuleBased);
    assert_eq!(metrics.commits_skipped, 1);
    assert_eq!(metrics.commits_processed, 1);
}

#[tokio::test]
async fn test_working_tree_pseudo_commit() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("new.txt"), "fresh\n").unwrap();

    let runner = ScriptedRunner::new()
        .ok(
            "status --porcelain=v1 --untracked-files=all",
            " M src/lib.rs\n?? new.txt\n",
        )
        .ok("diff HEAD -- src/lib.rs", "@@ -1 +1 @@\n-a\n+b\n")
        .ok("config user.name", "Test User\n")
        .ok("rev-parse HEAD", "abc\n");

    let analysis = analyze_working_tree(&runner, dir.path()).await.unwrap();
    assert_eq!(analysis.hash, "working-tree");
    assert_eq!(analysis.subject, "Uncommitted changes");
    assert_eq!(analysis.author, "Test User");
    assert_eq!(analysis.files.len(), 2);
    assert_eq!(analysis.files[1].status, FileStatus::Added);
    assert!(analysis.files[1].diff.contains("+fresh"));
}

#[tokio::test]
async fn test_clean_working_tree_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new().ok("status --porcelain=v1 --untracked-files=all", "");
    assert!(analyze_working_tree(&runner, dir.path()).await.is_none());
}

#[tokio::test]
async fn test_working_tree_deleted_file_previews_head_content() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new()
        .ok("status --porcelain=v1 --untracked-files=all", " D old.txt\n")
        .ok("show HEAD:old.txt", "first line\nsecond line\n");

    let analysis = analyze_working_tree(&runner, dir.path()).await.unwrap();
    let file = &analysis.files[0];
    assert_eq!(file.status, FileStatus::Deleted);
    assert!(file.diff.starts_with("Removed file (2 lines)"));
    assert!(file.diff.contains("-first line"));
    assert_eq!(file.deletions, 2);
    assert_eq!(file.before_content.as_deref(), Some("first line\nsecond line\n"));
}

#[tokio::test]
async fn test_working_tree_falls_back_to_staged_diff() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new()
        .ok(
            "status --porcelain=v1 --untracked-files=all",
            "M  src/lib.rs\nM  src/main.rs\n",
        )
        .ok("diff HEAD -- src/lib.rs", "")
        .ok("diff --cached -- src/lib.rs", "@@ -1 +1 @@\n-old\n+staged\n")
        .ok("diff --cached -- src/main.rs", "@@ -1 +1 @@\n-a\n+b\n");

    let analysis = analyze_working_tree(&runner, dir.path()).await.unwrap();
    assert_eq!(analysis.files.len(), 2);
    assert!(analysis.files[0].diff.contains("+staged"));
    assert!(analysis.files[1].diff.contains("+b"));

    let calls = runner.calls();
    assert!(calls.contains(&"diff HEAD -- src/lib.rs".to_string()));
    assert!(calls.contains(&"diff --cached -- src/lib.rs".to_string()));
}

#[tokio::test]
async fn test_working_tree_rename_keeps_old_path() {
    let dir = tempfile::tempdir().unwrap();
    let runner = ScriptedRunner::new()
        .ok(
            "status --porcelain=v1 --untracked-files=all",
            "R  src/old_name.rs -> src/new_name.rs\n",
        )
        .ok("diff HEAD -- src/new_name.rs", "@@ -1 +1 @@\n-fn a() {}\n+fn b() {}\n");

    let analysis = analyze_working_tree(&runner, dir.path()).await.unwrap();
    let file = &analysis.files[0];
    assert_eq!(file.status, FileStatus::Renamed);
    assert_eq!(file.path, "src/new_name.rs");
    assert_eq!(file.old_path.as_deref(), Some("src/old_name.rs"));
    assert!(file.diff.contains("+fn b() {}"));
}
