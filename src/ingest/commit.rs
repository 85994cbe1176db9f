//! Whole-commit ingestion: metadata, per-file changes, and commit-level signals.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{
    BusinessRelevance, CommitTag, Complexity, FileCategory, Importance, RiskLevel,
    assess_business_relevance, assess_risk, complexity_for_lines, tag_commit,
};
use crate::git::{ConventionalParts, RunnerExt, VersionControlRunner, parse_commit_message};
use crate::merge::{self, MERGE_DIGEST_THRESHOLD};

use super::file::{FileChange, FileStatus, MAX_FILE_DIFF_CHARS, ingest_committed_file, truncate_text};
use super::stat::{DiffStats, parse_name_status, parse_shortstat, parse_stat};

const METADATA_FORMAT: &str = "--format=%H%n%P%n%an%n%aI%n%s%n%b";

/// Identity and message of a commit (or of the working tree pseudo-commit).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMeta {
    pub hash: String,
    pub parents: Vec<String>,
    pub author: String,
    pub date: String,
    pub subject: String,
    pub body: String,
}

impl CommitMeta {
    /// Parse the output of `git show --no-patch` with [`METADATA_FORMAT`].
    pub fn parse(output: &str) -> Option<Self> {
        let mut lines = output.lines();
        let hash = lines.next()?.trim().to_string();
        if hash.is_empty() {
            return None;
        }
        let parents = lines
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let author = lines.next().unwrap_or_default().trim().to_string();
        let date = lines.next().unwrap_or_default().trim().to_string();
        let subject = lines.next().unwrap_or_default().trim().to_string();
        let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        Some(Self {
            hash,
            parents,
            author,
            date,
            subject,
            body,
        })
    }

    pub fn full_message(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n\n{}", self.subject, self.body)
        }
    }
}

/// Merge heuristic: the subject mentions "merge" or the commit has several parents.
///
/// A regular commit whose subject happens to contain "merge" is also treated
/// as a merge.
pub fn is_merge_commit(subject: &str, parent_count: usize) -> bool {
    parent_count > 1 || subject.to_lowercase().contains("merge")
}

/// Everything known about one commit before summarization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitAnalysis {
    pub hash: String,
    pub subject: String,
    pub author: String,
    pub date: String,
    pub body: String,
    pub parent_count: usize,
    pub merge_commit: bool,
    pub files: Vec<FileChange>,
    pub diff_stats: DiffStats,
    pub breaking_changes: Vec<String>,
    pub categories: Vec<FileCategory>,
    pub importance: Importance,
    pub tags: Vec<CommitTag>,
    pub risk: RiskLevel,
    pub complexity: Complexity,
    pub business_relevance: BusinessRelevance,
    #[serde(skip)]
    pub conventional: ConventionalParts,
}

impl CommitAnalysis {
    /// Derive every commit-level signal from metadata and ingested files.
    pub fn assemble(meta: CommitMeta, files: Vec<FileChange>, diff_stats: Option<DiffStats>) -> Self {
        let merge_commit = is_merge_commit(&meta.subject, meta.parents.len());
        let conventional = parse_commit_message(&meta.full_message());

        let diff_stats = diff_stats.unwrap_or_else(|| DiffStats {
            files: files.len(),
            insertions: files.iter().map(|f| f.additions).sum(),
            deletions: files.iter().map(|f| f.deletions).sum(),
        });

        let mut breaking_changes = conventional.breaking_notes.clone();
        if conventional.breaking_mark && breaking_changes.is_empty() {
            breaking_changes.push(meta.subject.clone());
        }
        // Merge file entries carry stat summaries, not diffs, so nothing is inferred for them.
        if !merge_commit {
            breaking_changes.extend(inferred_breaking_changes(&files));
        }

        let categories: Vec<FileCategory> = files
            .iter()
            .map(FileChange::category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let importance = files
            .iter()
            .map(|f| f.classification.importance)
            .max()
            .unwrap_or(Importance::Low);

        let tags = tag_commit(&meta.subject, &conventional, &files, merge_commit);
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        let business_relevance = assess_business_relevance(&meta.full_message(), &paths);

        let mut analysis = Self {
            hash: meta.hash,
            subject: meta.subject,
            author: meta.author,
            date: meta.date,
            body: meta.body,
            parent_count: meta.parents.len(),
            merge_commit,
            complexity: complexity_for_lines(diff_stats.total_changes()),
            files,
            diff_stats,
            breaking_changes,
            categories,
            importance,
            tags,
            risk: RiskLevel::Low,
            business_relevance,
            conventional,
        };
        analysis.risk = assess_risk(
            &analysis.combined_diff(),
            analysis.diff_stats.files.max(analysis.files.len()),
            &analysis.subject,
        );
        analysis
    }

    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(7);
        self.hash.get(..end).unwrap_or(&self.hash)
    }

    /// All file diffs joined with `diff --git` headers.
    pub fn combined_diff(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            out.push_str(&format!("diff --git a/{0} b/{0}\n", file.path));
            out.push_str(&file.diff);
            if !file.diff.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    /// Merge digest carried on the first file, if any.
    pub fn merge_digest(&self) -> Option<&str> {
        self.files.first()?.enhanced_merge_summary.as_deref()
    }

    pub fn file_count(&self) -> usize {
        self.diff_stats.files.max(self.files.len())
    }

    pub fn added_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.status == FileStatus::Added)
            .count()
    }

    pub fn has_breaking_changes(&self) -> bool {
        !self.breaking_changes.is_empty() || self.conventional.is_breaking()
    }
}

/// Source files that were deleted or lost a public signature.
fn inferred_breaking_changes(files: &[FileChange]) -> Vec<String> {
    files
        .iter()
        .filter(|f| f.category() == FileCategory::Source)
        .filter(|f| !f.classification.functional_impact.backward_compatible)
        .map(|f| match f.status {
            FileStatus::Deleted => format!("Removes {}", f.path),
            _ => format!("Changes public signatures in {}", f.path),
        })
        .collect()
}

/// Analyze one commit. Returns `None` when the commit cannot be resolved.
///
/// Individual file failures never abort the commit; they become placeholders.
pub async fn analyze_commit<R: VersionControlRunner + ?Sized>(
    runner: &R,
    hash: &str,
) -> Option<CommitAnalysis> {
    let meta = match runner.run(&["show", "--no-patch", METADATA_FORMAT, hash]).await {
        Ok(out) => CommitMeta::parse(&out)?,
        Err(e) => {
            warn!(hash = %hash, error = %e, "Could not resolve commit, skipping");
            return None;
        }
    };

    if is_merge_commit(&meta.subject, meta.parents.len()) {
        let (files, stats) = ingest_merge_files(runner, &meta).await;
        return Some(CommitAnalysis::assemble(meta, files, stats));
    }

    let name_status = match runner
        .run(&["show", "--name-status", "-M", "--format=", meta.hash.as_str()])
        .await
    {
        Ok(out) => out,
        Err(e) => {
            warn!(hash = %hash, error = %e, "Could not list changed files, skipping");
            return None;
        }
    };

    let mut files = Vec::new();
    for entry in parse_name_status(&name_status) {
        files.push(ingest_committed_file(runner, &meta.hash, &entry).await);
    }

    let shortstat = runner
        .run_safe(&["show", "--shortstat", "--format=", meta.hash.as_str()])
        .await;
    let stats = shortstat.lines().find_map(parse_shortstat);

    debug!(hash = %meta.hash, files = files.len(), "Ingested commit");
    Some(CommitAnalysis::assemble(meta, files, stats))
}

/// Diff args comparing a merge against its first parent, or a plain `show`.
fn merge_diff_args<'a>(meta: &'a CommitMeta, first_parent: &'a str) -> Vec<&'a str> {
    if meta.parents.len() > 1 {
        vec!["diff", first_parent, meta.hash.as_str()]
    } else {
        vec!["show", "--format=", meta.hash.as_str()]
    }
}

/// Files of a merge commit from `--stat`, with a digest on high fan-out.
async fn ingest_merge_files<R: VersionControlRunner + ?Sized>(
    runner: &R,
    meta: &CommitMeta,
) -> (Vec<FileChange>, Option<DiffStats>) {
    let first_parent = format!("{}^1", meta.hash);
    let mut stat_args = merge_diff_args(meta, &first_parent);
    stat_args.push("--stat=1000");
    let stat_output = runner.run_safe(&stat_args).await;
    let (entries, stats) = parse_stat(&stat_output);

    let mut files: Vec<FileChange> = entries
        .into_iter()
        .map(|entry| {
            let summary = format!(
                "Merged change: {} (+{} -{})",
                entry.path, entry.additions, entry.deletions
            );
            FileChange::new(entry.status, entry.path, summary)
                .with_counts(entry.additions, entry.deletions)
                .with_old_path(entry.old_path)
        })
        .collect();

    if files.len() > MERGE_DIGEST_THRESHOLD {
        let mut samples = HashMap::new();
        for path in merge::select_key_files(&files) {
            let mut args = merge_diff_args(meta, &first_parent);
            args.extend(["--", path]);
            if let Some(diff) = runner.run_or_null(&args).await {
                samples.insert(path.to_string(), truncate_text(&diff, MAX_FILE_DIFF_CHARS));
            }
        }
        let digest = merge::build_digest(&files, &samples);
        debug!(hash = %meta.hash, bullets = digest.bullets.len(), "Built merge digest");
        if let Some(first) = files.first_mut() {
            first.enhanced_merge_summary = Some(digest.render());
        }
    }

    (files, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_meta_with_body() {
        let out = "abc123\np1 p2\nAda\n2024-05-01T10:00:00+00:00\nMerge branch 'x'\nline one\n\nline two\n";
        let meta = CommitMeta::parse(out).unwrap();
        assert_eq!(meta.hash, "abc123");
        assert_eq!(meta.parents, vec!["p1", "p2"]);
        assert_eq!(meta.subject, "Merge branch 'x'");
        assert_eq!(meta.body, "line one\n\nline two");
    }

    #[test]
    fn test_parse_meta_rejects_empty() {
        assert!(CommitMeta::parse("").is_none());
    }

    #[test]
    fn test_merge_heuristic() {
        assert!(is_merge_commit("Merge pull request #4", 1));
        assert!(is_merge_commit("sync", 2));
        assert!(!is_merge_commit("fix: typo", 1));
        // Known limitation: wording alone triggers the heuristic.
        assert!(is_merge_commit("Add merge sort helper", 1));
    }

    #[test]
    fn test_assemble_derives_signals() {
        let meta = CommitMeta {
            hash: "0123456789abcdef".to_string(),
            parents: vec!["p".to_string()],
            subject: "feat!: drop legacy config".to_string(),
            ..Default::default()
        };
        let files = vec![
            FileChange::new(FileStatus::Modified, "src/config.rs", "+a\n-b\n"),
            FileChange::new(FileStatus::Modified, "README.md", "+docs\n"),
        ];
        let analysis = CommitAnalysis::assemble(meta, files, None);
        assert_eq!(analysis.short_hash(), "0123456");
        assert_eq!(analysis.diff_stats.files, 2);
        assert_eq!(analysis.diff_stats.insertions, 2);
        assert!(analysis.has_breaking_changes());
        assert_eq!(analysis.breaking_changes, vec!["feat!: drop legacy config"]);
        assert!(analysis.tags.contains(&CommitTag::Breaking));
        assert_eq!(analysis.categories.len(), 2);
        assert!(!analysis.merge_commit);
    }
}
