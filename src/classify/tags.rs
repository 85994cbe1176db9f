//! Commit-level tagging heuristic and the change categories derived from it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::git::{CommitType, ConventionalParts};
use crate::ingest::FileChange;

use super::file::{FileCategory, is_manifest};

/// Changelog category of a commit.
///
/// Serializes to lowercase. Deserializes case-insensitively and accepts common
/// aliases (`feat`, `bugfix`, `documentation`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeCategory {
    Feature,
    Fix,
    Refactor,
    Docs,
    Test,
    Perf,
    Security,
    Build,
    Ci,
    Style,
    Chore,
    Merge,
    Other,
}

impl ChangeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Test => "test",
            Self::Perf => "perf",
            Self::Security => "security",
            Self::Build => "build",
            Self::Ci => "ci",
            Self::Style => "style",
            Self::Chore => "chore",
            Self::Merge => "merge",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feature" | "feat" | "features" | "enhancement" => Ok(Self::Feature),
            "fix" | "bugfix" | "bug" | "hotfix" | "fixes" => Ok(Self::Fix),
            "refactor" | "refactoring" => Ok(Self::Refactor),
            "docs" | "doc" | "documentation" => Ok(Self::Docs),
            "test" | "tests" | "testing" => Ok(Self::Test),
            "perf" | "performance" => Ok(Self::Perf),
            "security" => Ok(Self::Security),
            "build" | "deps" | "dependencies" => Ok(Self::Build),
            "ci" => Ok(Self::Ci),
            "style" => Ok(Self::Style),
            "chore" | "maintenance" => Ok(Self::Chore),
            "merge" => Ok(Self::Merge),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for ChangeCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<ChangeCategory>().map_err(serde::de::Error::custom)
    }
}

/// Tags attached to a commit. Declaration order is dominance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitTag {
    Merge,
    Breaking,
    Security,
    Feature,
    Fix,
    Performance,
    Refactor,
    Docs,
    Test,
    Dependencies,
    Build,
    Ci,
    Style,
    Ui,
    Chore,
}

impl CommitTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Breaking => "breaking",
            Self::Security => "security",
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Performance => "performance",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Test => "test",
            Self::Dependencies => "dependencies",
            Self::Build => "build",
            Self::Ci => "ci",
            Self::Style => "style",
            Self::Ui => "ui",
            Self::Chore => "chore",
        }
    }

    /// Category this tag implies, if any.
    pub fn category(&self) -> Option<ChangeCategory> {
        match self {
            Self::Merge => Some(ChangeCategory::Merge),
            Self::Breaking => None,
            Self::Security => Some(ChangeCategory::Security),
            Self::Feature | Self::Ui => Some(ChangeCategory::Feature),
            Self::Fix => Some(ChangeCategory::Fix),
            Self::Performance => Some(ChangeCategory::Perf),
            Self::Refactor => Some(ChangeCategory::Refactor),
            Self::Docs => Some(ChangeCategory::Docs),
            Self::Test => Some(ChangeCategory::Test),
            Self::Dependencies | Self::Build => Some(ChangeCategory::Build),
            Self::Ci => Some(ChangeCategory::Ci),
            Self::Style => Some(ChangeCategory::Style),
            Self::Chore => Some(ChangeCategory::Chore),
        }
    }

    fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Feature | Self::Fix | Self::Security | Self::Performance | Self::Ui | Self::Breaking
        )
    }
}

impl fmt::Display for CommitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SUBJECT_KEYWORDS: &[(CommitTag, &[&str])] = &[
    (CommitTag::Security, &["security", "vulnerab", "cve-", "xss", "csrf", "injection"]),
    (CommitTag::Feature, &["add ", "adds ", "added ", "implement", "introduce", "new ", "support "]),
    (CommitTag::Fix, &["fix", "bug", "resolve", "patch ", "correct", "repair"]),
    (CommitTag::Performance, &["perf", "optimiz", "speed up", "faster", "cache "]),
    (CommitTag::Refactor, &["refactor", "restructure", "cleanup", "clean up", "simplify", "rename"]),
    (CommitTag::Docs, &["docs", "readme", "documentation"]),
    (CommitTag::Test, &["test"]),
    (CommitTag::Dependencies, &["bump ", "upgrade", "dependenc", "deps"]),
    (CommitTag::Style, &["format", "lint", "whitespace"]),
];

fn tag_for_type(commit_type: CommitType) -> CommitTag {
    match commit_type {
        CommitType::Feat => CommitTag::Feature,
        CommitType::Fix => CommitTag::Fix,
        CommitType::Docs => CommitTag::Docs,
        CommitType::Style => CommitTag::Style,
        CommitType::Refactor => CommitTag::Refactor,
        CommitType::Perf => CommitTag::Performance,
        CommitType::Test => CommitTag::Test,
        CommitType::Build => CommitTag::Build,
        CommitType::Ci => CommitTag::Ci,
        CommitType::Chore | CommitType::Revert => CommitTag::Chore,
    }
}

/// Tag a commit from its conventional markers, subject keywords, and files.
///
/// Always returns at least one tag; `Chore` when nothing else matched.
pub fn tag_commit(
    subject: &str,
    conventional: &ConventionalParts,
    files: &[FileChange],
    merge_commit: bool,
) -> Vec<CommitTag> {
    let mut tags = BTreeSet::new();
    let lower = format!("{} ", subject.to_lowercase());

    if merge_commit {
        tags.insert(CommitTag::Merge);
    }
    if conventional.is_breaking() || lower.contains("breaking") {
        tags.insert(CommitTag::Breaking);
    }
    if let Some(commit_type) = conventional.commit_type {
        tags.insert(tag_for_type(commit_type));
    } else {
        for (tag, keywords) in SUBJECT_KEYWORDS {
            if keywords.iter().any(|kw| lower.contains(kw)) {
                tags.insert(*tag);
            }
        }
    }

    if !files.is_empty() {
        if files.iter().all(|f| f.category() == FileCategory::Documentation) {
            tags.insert(CommitTag::Docs);
        }
        if files.iter().all(|f| f.category() == FileCategory::Tests) {
            tags.insert(CommitTag::Test);
        }
    }
    if files.iter().any(|f| is_manifest(&f.path)) {
        tags.insert(CommitTag::Dependencies);
    }
    if files.iter().any(|f| f.path.starts_with(".github/workflows") || f.path.contains(".gitlab-ci")) {
        tags.insert(CommitTag::Ci);
    }
    if files.iter().any(|f| f.category() == FileCategory::Frontend) {
        tags.insert(CommitTag::Ui);
    }

    if tags.is_empty() {
        tags.insert(CommitTag::Chore);
    }

    tags.into_iter().collect()
}

/// Category implied by the most dominant categorizing tag.
pub fn dominant_category(tags: &[CommitTag]) -> ChangeCategory {
    let mut ordered = tags.to_vec();
    ordered.sort();
    ordered
        .iter()
        .find_map(|t| t.category())
        .unwrap_or(ChangeCategory::Other)
}

/// Whether any tag marks the commit as visible to end users.
pub fn is_user_facing(tags: &[CommitTag]) -> bool {
    tags.iter().any(CommitTag::is_user_facing)
}
