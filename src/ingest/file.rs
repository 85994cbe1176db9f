//! Per-file change records and diff retrieval for committed changes.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{ClassificationResult, FileCategory, classify_file};
use crate::classify::file::count_changed_lines;
use crate::git::{Probe, RunnerExt, VersionControlRunner};

use super::stat::NameStatusEntry;

/// Lines of context requested around each hunk.
pub const DIFF_CONTEXT_LINES: usize = 3;

/// Maximum characters of diff kept per file.
pub const MAX_FILE_DIFF_CHARS: usize = 8_000;

/// Content previews stop at whichever limit is reached first.
pub const PREVIEW_CHARS: usize = 1_000;
pub const PREVIEW_LINES: usize = 40;

pub const DELETED_PLACEHOLDER: &str = "File deleted in this commit";
pub const UNAVAILABLE_PLACEHOLDER: &str = "Diff unavailable for this file";
const NO_TEXT_PLACEHOLDER: &str = "No textual changes (binary or mode-only change)";

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Unknown,
}

impl FileStatus {
    /// Map a `git --name-status` / porcelain status letter.
    pub fn from_code(code: char) -> Self {
        match code {
            'A' | 'C' | '?' => FileStatus::Added,
            'M' | 'T' => FileStatus::Modified,
            'D' => FileStatus::Deleted,
            'R' => FileStatus::Renamed,
            _ => FileStatus::Unknown,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
            FileStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One touched file with its bounded diff view and classification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub status: FileStatus,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    pub diff: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_content: Option<String>,
    pub additions: usize,
    pub deletions: usize,
    pub classification: ClassificationResult,
    /// Merge digest, only ever set on the first file of a merge commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_merge_summary: Option<String>,
}

impl FileChange {
    /// Build a change, counting lines and classifying from the diff text.
    pub fn new(status: FileStatus, path: impl Into<String>, diff: impl Into<String>) -> Self {
        let path = path.into();
        let diff = diff.into();
        let (additions, deletions) = count_changed_lines(&diff);
        let classification = classify_file(&path, &diff, status);
        Self {
            status,
            path,
            old_path: None,
            diff,
            before_content: None,
            after_content: None,
            additions,
            deletions,
            classification,
            enhanced_merge_summary: None,
        }
    }

    /// Override line counts when the diff text is a preview or a synthetic summary.
    pub fn with_counts(mut self, additions: usize, deletions: usize) -> Self {
        self.additions = additions;
        self.deletions = deletions;
        self.classification.complexity = crate::classify::complexity_for_lines(additions + deletions);
        self
    }

    pub fn with_old_path(mut self, old_path: Option<String>) -> Self {
        self.old_path = old_path;
        self
    }

    pub fn with_before_content(mut self, content: Option<String>) -> Self {
        self.before_content = content;
        self
    }

    pub fn with_after_content(mut self, content: Option<String>) -> Self {
        self.after_content = content;
        self
    }

    pub fn category(&self) -> FileCategory {
        self.classification.category
    }

    pub fn changed_lines(&self) -> usize {
        self.additions + self.deletions
    }
}

/// Truncate on a char boundary, marking the cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_string();
    }
    let mut end = max_chars;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n... (truncated, {} more bytes)", &text[..end], text.len() - end)
}

/// First lines of `content`, each prefixed with `marker`, bounded by the preview limits.
pub fn content_preview(label: &str, content: &str, marker: char) -> String {
    let total_lines = content.lines().count();
    let mut preview = String::new();
    for line in content.lines().take(PREVIEW_LINES) {
        if preview.len() + line.len() + 2 > PREVIEW_CHARS {
            break;
        }
        preview.push(marker);
        preview.push_str(line);
        preview.push('\n');
    }
    format!("{label} ({total_lines} lines), content preview:\n{preview}")
}

/// Retrieve the diff for one file of a commit, degrading to placeholders.
///
/// Never fails: a retrieval problem becomes an explanatory diff string.
pub async fn ingest_committed_file<R: VersionControlRunner + ?Sized>(
    runner: &R,
    hash: &str,
    entry: &NameStatusEntry,
) -> FileChange {
    let unified = format!("--unified={DIFF_CONTEXT_LINES}");
    let mut args = vec!["show", "--format=", "-M", unified.as_str(), hash, "--"];
    if let Some(old) = entry.old_path.as_deref() {
        args.push(old);
    }
    args.push(&entry.path);

    let change = match (runner.probe(&args).await, entry.status) {
        (Probe::Output(diff), status) => {
            FileChange::new(status, entry.path.as_str(), truncate_text(&diff, MAX_FILE_DIFF_CHARS))
        }
        (Probe::Empty, FileStatus::Added) => added_file_preview(runner, hash, &entry.path).await,
        (Probe::Empty | Probe::Failed(_), FileStatus::Deleted) => {
            let previous = runner
                .run_or_null(&["show", &format!("{hash}^:{}", entry.path)])
                .await;
            let deletions = previous.as_deref().map(|c| c.lines().count()).unwrap_or(0);
            FileChange::new(FileStatus::Deleted, entry.path.as_str(), DELETED_PLACEHOLDER)
                .with_counts(0, deletions)
                .with_before_content(previous)
        }
        (Probe::Empty, status) => FileChange::new(status, entry.path.as_str(), NO_TEXT_PLACEHOLDER),
        (Probe::Failed(reason), status) => {
            warn!(hash = %hash, path = %entry.path, reason = %reason, "Diff retrieval failed, using placeholder");
            FileChange::new(status, entry.path.as_str(), UNAVAILABLE_PLACEHOLDER)
        }
    };

    change.with_old_path(entry.old_path.clone())
}

/// Show the start of a newly added file when the diff tool printed nothing.
async fn added_file_preview<R: VersionControlRunner + ?Sized>(
    runner: &R,
    hash: &str,
    path: &str,
) -> FileChange {
    match runner.run_or_null(&["show", &format!("{hash}:{path}")]).await {
        Some(content) if !content.is_empty() => {
            debug!(path = %path, "Empty diff for added file, using content preview");
            let total = content.lines().count();
            FileChange::new(FileStatus::Added, path, content_preview("New file", &content, '+'))
                .with_counts(total, 0)
                .with_after_content(Some(content))
        }
        Some(_) => FileChange::new(FileStatus::Added, path, "New empty file"),
        None => FileChange::new(FileStatus::Added, path, UNAVAILABLE_PLACEHOLDER),
    }
}
