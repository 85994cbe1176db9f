//! Uncommitted changes ingested as a single pseudo-commit.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, warn};

use crate::git::{Probe, RunnerExt, VersionControlRunner};

use super::commit::{CommitAnalysis, CommitMeta};
use super::file::{
    FileChange, FileStatus, MAX_FILE_DIFF_CHARS, UNAVAILABLE_PLACEHOLDER, content_preview,
    truncate_text,
};

pub const WORKING_TREE_HASH: &str = "working-tree";
pub const WORKING_TREE_SUBJECT: &str = "Uncommitted changes";

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub status: FileStatus,
    pub path: String,
    pub old_path: Option<String>,
    pub untracked: bool,
}

/// Parse porcelain v1 status lines (`XY path` or `XY old -> new`).
pub fn parse_porcelain(output: &str) -> Vec<StatusEntry> {
    output
        .lines()
        .filter_map(|line| {
            if line.len() < 4 {
                return None;
            }
            let (code, rest) = line.split_at_checked(2)?;
            let rest = rest.trim();
            let untracked = code == "??";
            let (index, worktree) = {
                let mut chars = code.chars();
                (chars.next()?, chars.next()?)
            };

            let status = if untracked {
                FileStatus::Added
            } else if index == 'R' || worktree == 'R' {
                FileStatus::Renamed
            } else if index == 'A' || worktree == 'A' {
                FileStatus::Added
            } else if index == 'D' || worktree == 'D' {
                FileStatus::Deleted
            } else if index == 'M' || worktree == 'M' || index == 'T' || worktree == 'T' {
                FileStatus::Modified
            } else {
                FileStatus::Unknown
            };

            let (path, old_path) = match rest.split_once(" -> ") {
                Some((old, new)) => (unquote(new), Some(unquote(old))),
                None => (unquote(rest), None),
            };

            Some(StatusEntry {
                status,
                path,
                old_path,
                untracked,
            })
        })
        .collect()
}

fn unquote(path: &str) -> String {
    path.trim().trim_matches('"').to_string()
}

/// Ingest one uncommitted file. Never fails.
pub async fn ingest_working_file<R: VersionControlRunner + ?Sized>(
    runner: &R,
    root: &Path,
    entry: &StatusEntry,
) -> FileChange {
    let change = match entry.status {
        FileStatus::Added => {
            let content = match tokio::fs::read_to_string(root.join(&entry.path)).await {
                Ok(content) => Some(content),
                Err(e) => {
                    debug!(path = %entry.path, error = %e, "Reading new file failed, trying index");
                    runner.run_or_null(&["show", &format!(":{}", entry.path)]).await
                }
            };
            match content {
                Some(content) => {
                    let total = content.lines().count();
                    FileChange::new(
                        FileStatus::Added,
                        entry.path.as_str(),
                        content_preview("New file", &content, '+'),
                    )
                    .with_counts(total, 0)
                    .with_after_content(Some(content))
                }
                None => {
                    FileChange::new(FileStatus::Added, entry.path.as_str(), UNAVAILABLE_PLACEHOLDER)
                }
            }
        }
        FileStatus::Deleted => {
            match runner.run_or_null(&["show", &format!("HEAD:{}", entry.path)]).await {
                Some(content) => {
                    let total = content.lines().count();
                    FileChange::new(
                        FileStatus::Deleted,
                        entry.path.as_str(),
                        content_preview("Removed file", &content, '-'),
                    )
                    .with_counts(0, total)
                    .with_before_content(Some(content))
                }
                None => FileChange::new(
                    FileStatus::Deleted,
                    entry.path.as_str(),
                    "File deleted from working tree",
                ),
            }
        }
        status => {
            let diff = match runner.probe(&["diff", "HEAD", "--", entry.path.as_str()]).await {
                Probe::Output(diff) => Some(diff),
                Probe::Empty | Probe::Failed(_) => runner
                    .probe(&["diff", "--cached", "--", entry.path.as_str()])
                    .await
                    .output()
                    .map(str::to_string),
            };
            match diff {
                Some(diff) => FileChange::new(status, entry.path.as_str(), truncate_text(&diff, MAX_FILE_DIFF_CHARS)),
                None => {
                    warn!(path = %entry.path, "No diff available for uncommitted change");
                    FileChange::new(status, entry.path.as_str(), UNAVAILABLE_PLACEHOLDER)
                }
            }
        }
    };

    change.with_old_path(entry.old_path.clone())
}

/// Analyze uncommitted changes. Returns `None` when the tree is clean or
/// status cannot be read.
pub async fn analyze_working_tree<R: VersionControlRunner + ?Sized>(
    runner: &R,
    root: &Path,
) -> Option<CommitAnalysis> {
    let status = match runner
        .run(&["status", "--porcelain=v1", "--untracked-files=all"])
        .await
    {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "Could not read working tree status");
            return None;
        }
    };

    let entries = parse_porcelain(&status);
    if entries.is_empty() {
        debug!("Working tree is clean");
        return None;
    }

    let mut files = Vec::with_capacity(entries.len());
    for entry in &entries {
        files.push(ingest_working_file(runner, root, entry).await);
    }

    let author = runner.run_safe(&["config", "user.name"]).await.trim().to_string();
    let head = runner.run_or_null(&["rev-parse", "HEAD"]).await;
    let meta = CommitMeta {
        hash: WORKING_TREE_HASH.to_string(),
        parents: head.map(|h| vec![h.trim().to_string()]).unwrap_or_default(),
        author,
        date: Utc::now().to_rfc3339(),
        subject: WORKING_TREE_SUBJECT.to_string(),
        body: String::new(),
    };

    Some(CommitAnalysis::assemble(meta, files, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_porcelain_statuses() {
        let out = " M src/lib.rs\nA  src/new.rs\n D old.txt\n?? notes/todo.md\nR  a.rs -> b.rs\n";
        let entries = parse_porcelain(out);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].status, FileStatus::Modified);
        assert_eq!(entries[0].path, "src/lib.rs");
        assert_eq!(entries[1].status, FileStatus::Added);
        assert_eq!(entries[2].status, FileStatus::Deleted);
        assert!(entries[3].untracked);
        assert_eq!(entries[3].status, FileStatus::Added);
        assert_eq!(entries[4].status, FileStatus::Renamed);
        assert_eq!(entries[4].path, "b.rs");
        assert_eq!(entries[4].old_path.as_deref(), Some("a.rs"));
    }

    #[test]
    fn test_parse_porcelain_quoted_path() {
        let entries = parse_porcelain("?? \"dir with space/file.txt\"\n");
        assert_eq!(entries[0].path, "dir with space/file.txt");
    }
}
