//! Merge digest compression.
//!
//! High fan-out merge commits are summarized as one bucketed digest instead of
//! per-file diffs. Each non-empty bucket yields one bullet, so the digest size
//! is bounded by the number of buckets regardless of how many files changed.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::classify::file::is_manifest;
use crate::ingest::FileChange;

/// Merge commits with more files than this get a digest.
pub const MERGE_DIGEST_THRESHOLD: usize = 10;

/// Maximum files sampled for technical detail.
pub const MAX_KEY_FILES: usize = 5;

/// Example filenames listed per bullet.
pub const EXAMPLES_PER_BUCKET: usize = 3;

/// Files changing more lines than this are worth sampling.
const LARGE_FILE_LINES: usize = 100;

const MAX_DETAIL_ITEMS: usize = 5;

/// Coarse area of the codebase a merged file belongs to. Declaration order is
/// match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MergeBucket {
    Tests,
    Docs,
    Config,
    CoreDomain,
    Infrastructure,
    Cli,
    Other,
}

impl MergeBucket {
    pub const ALL: [MergeBucket; 7] = [
        MergeBucket::Tests,
        MergeBucket::Docs,
        MergeBucket::Config,
        MergeBucket::CoreDomain,
        MergeBucket::Infrastructure,
        MergeBucket::Cli,
        MergeBucket::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MergeBucket::Tests => "Tests",
            MergeBucket::Docs => "Documentation",
            MergeBucket::Config => "Configuration",
            MergeBucket::CoreDomain => "Core domain",
            MergeBucket::Infrastructure => "Infrastructure",
            MergeBucket::Cli => "CLI",
            MergeBucket::Other => "Other",
        }
    }

    fn markers(&self) -> &'static [&'static str] {
        match self {
            MergeBucket::Tests => &["test", "spec.", "__tests__", "fixtures/"],
            MergeBucket::Docs => &[".md", ".rst", ".adoc", "docs/", "readme", "changelog", "license"],
            MergeBucket::Config => &[
                ".json", ".toml", ".yaml", ".yml", ".ini", ".env", ".gitignore", ".lock", "config",
            ],
            MergeBucket::CoreDomain => &[
                "src/", "lib/", "core/", "domain/", "model", "service", "internal/", "pkg/",
            ],
            MergeBucket::Infrastructure => &[
                "docker", ".github/", "ci/", "deploy", "terraform", "k8s", "helm", "infra", "scripts/",
                "makefile",
            ],
            MergeBucket::Cli => &["cli", "bin/", "cmd/", "command"],
            MergeBucket::Other => &[],
        }
    }

    /// First bucket whose markers appear in the path.
    pub fn for_path(path: &str) -> MergeBucket {
        let lower = path.to_lowercase();
        if is_manifest(path) && !lower.contains("test") {
            return MergeBucket::Config;
        }
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.markers().iter().any(|m| lower.contains(m)))
            .unwrap_or(MergeBucket::Other)
    }
}

impl fmt::Display for MergeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn key_file_rank(file: &FileChange) -> Option<u8> {
    let lower = file.path.to_lowercase();
    if is_manifest(&file.path) {
        Some(0)
    } else if lower.ends_with(".gitignore") {
        Some(1)
    } else if MergeBucket::for_path(&file.path) == MergeBucket::Config {
        Some(2)
    } else if file.changed_lines() > LARGE_FILE_LINES {
        Some(3)
    } else {
        None
    }
}

/// Pick at most [`MAX_KEY_FILES`] files worth fetching full diffs for.
///
/// Manifests come first, then ignore files, config, and large changes, each
/// group in original order.
pub fn select_key_files(files: &[FileChange]) -> Vec<&str> {
    let mut ranked: Vec<(u8, &str)> = files
        .iter()
        .filter_map(|f| key_file_rank(f).map(|rank| (rank, f.path.as_str())))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().take(MAX_KEY_FILES).map(|(_, path)| path).collect()
}

static DEPENDENCY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^([+-])\s*"?([@A-Za-z0-9_./-]+)"?\s*(?::|=|==|>=|~=)\s*(?:\{\s*version\s*=\s*)?"?([~^<>=]*[0-9][0-9A-Za-z.+-]*)"?"#,
    )
    .expect("dependency line pattern")
});

static NEW_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\+\s*(?:pub(?:\([a-z]+\))?\s+)?(?:export\s+)?(?:default\s+)?(?:async\s+)?(?:fn|function|class|def|struct|trait|interface|enum)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("new symbol pattern")
});

/// Version deltas, additions, and removals of dependencies in a manifest diff.
fn dependency_changes(diff: &str) -> Vec<String> {
    let mut removed: BTreeMap<String, String> = BTreeMap::new();
    let mut added: BTreeMap<String, String> = BTreeMap::new();
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }
        if let Some(caps) = DEPENDENCY_LINE.captures(line) {
            let name = caps[2].to_string();
            let version = caps[3].to_string();
            if &caps[1] == "+" {
                added.insert(name, version);
            } else {
                removed.insert(name, version);
            }
        }
    }

    let mut changes = Vec::new();
    for (name, new_version) in &added {
        match removed.get(name) {
            Some(old_version) if old_version != new_version => {
                changes.push(format!("{name} {old_version} -> {new_version}"))
            }
            Some(_) => {}
            None => changes.push(format!("added {name} {new_version}")),
        }
    }
    for name in removed.keys().filter(|name| !added.contains_key(*name)) {
        changes.push(format!("removed {name}"));
    }
    changes.truncate(MAX_DETAIL_ITEMS);
    changes
}

fn ignore_pattern_changes(diff: &str) -> Vec<String> {
    let mut changes = Vec::new();
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            continue;
        }
        let (verb, pattern) = match line.split_at_checked(1) {
            Some(("+", rest)) => ("ignores", rest.trim()),
            Some(("-", rest)) => ("stops ignoring", rest.trim()),
            _ => continue,
        };
        if pattern.is_empty() || pattern.starts_with('#') {
            continue;
        }
        changes.push(format!("{verb} {pattern}"));
    }
    changes.truncate(MAX_DETAIL_ITEMS);
    changes
}

fn new_symbols(diff: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in diff.lines().filter_map(|line| NEW_SYMBOL.captures(line)) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
        if names.len() == MAX_DETAIL_ITEMS {
            break;
        }
    }
    if names.is_empty() {
        return names;
    }
    vec![format!("introduces {}", names.join(", "))]
}

/// Targeted technical detail for one sampled file.
pub fn extract_detail(path: &str, diff: &str) -> Option<String> {
    let changes = if is_manifest(path) {
        dependency_changes(diff)
    } else if path.to_lowercase().ends_with(".gitignore") {
        ignore_pattern_changes(diff)
    } else {
        new_symbols(diff)
    };

    if changes.is_empty() {
        None
    } else {
        let name = path.rsplit('/').next().unwrap_or(path);
        Some(format!("{name}: {}", changes.join("; ")))
    }
}

/// Bounded, bucketed summary of a merge commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeDigest {
    pub header: String,
    pub bullets: Vec<String>,
}

impl MergeDigest {
    pub fn render(&self) -> String {
        let mut out = self.header.clone();
        for bullet in &self.bullets {
            out.push('\n');
            out.push_str(bullet);
        }
        out
    }
}

impl fmt::Display for MergeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[derive(Default)]
struct BucketSummary<'a> {
    files: Vec<&'a str>,
    lines: usize,
    details: Vec<String>,
}

/// Build a digest from the merge's files and full diffs of the sampled key files.
pub fn build_digest(files: &[FileChange], samples: &HashMap<String, String>) -> MergeDigest {
    let mut buckets: BTreeMap<MergeBucket, BucketSummary> = BTreeMap::new();
    for file in files {
        let summary = buckets.entry(MergeBucket::for_path(&file.path)).or_default();
        summary.files.push(&file.path);
        summary.lines += file.changed_lines();
    }

    for (path, diff) in samples {
        if let Some(detail) = extract_detail(path, diff) {
            buckets
                .entry(MergeBucket::for_path(path))
                .or_default()
                .details
                .push(detail);
        }
    }

    let total_lines: usize = files.iter().map(FileChange::changed_lines).sum();
    let header = format!(
        "Merge touching {} files (~{} lines changed) across {} areas:",
        files.len(),
        total_lines,
        buckets.values().filter(|b| !b.files.is_empty()).count()
    );

    let bullets = buckets
        .iter()
        .filter(|(_, summary)| !summary.files.is_empty())
        .map(|(bucket, summary)| {
            let mut examples: Vec<&str> = summary
                .files
                .iter()
                .take(EXAMPLES_PER_BUCKET)
                .map(|p| p.rsplit('/').next().unwrap_or(p))
                .collect();
            if summary.files.len() > EXAMPLES_PER_BUCKET {
                examples.push("...");
            }
            let mut bullet = format!(
                "- {}: {} files ({}), ~{} lines changed",
                bucket,
                summary.files.len(),
                examples.join(", "),
                summary.lines
            );
            if !summary.details.is_empty() {
                let mut details = summary.details.clone();
                details.sort();
                bullet.push_str(&format!(". {}", details.join(". ")));
            }
            bullet
        })
        .collect();

    MergeDigest { header, bullets }
}
