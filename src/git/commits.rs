//! Commit discovery and conventional commit parsing.

use std::sync::LazyLock;

use git2::{Commit, Oid, Repository, Sort};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GitError;

use super::range::CommitRange;

static CONVENTIONAL_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\(([^)]+)\))?(!)?\s*:\s*").expect("conventional commit pattern")
});

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
}

impl std::str::FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" | "feature" => Ok(Self::Feat),
            "fix" | "bugfix" | "hotfix" => Ok(Self::Fix),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "perf" => Ok(Self::Perf),
            "test" | "tests" => Ok(Self::Test),
            "build" => Ok(Self::Build),
            "ci" => Ok(Self::Ci),
            "chore" => Ok(Self::Chore),
            "revert" => Ok(Self::Revert),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// Conventional commit markers parsed from a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConventionalParts {
    pub commit_type: Option<CommitType>,
    pub scope: Option<String>,
    /// `!` after the type/scope.
    pub breaking_mark: bool,
    /// Text following `BREAKING CHANGE:` / `BREAKING-CHANGE:` footers.
    pub breaking_notes: Vec<String>,
}

impl ConventionalParts {
    pub fn is_breaking(&self) -> bool {
        self.breaking_mark || !self.breaking_notes.is_empty()
    }
}

/// Parse a conventional commit message (subject plus optional body).
pub fn parse_commit_message(message: &str) -> ConventionalParts {
    let first_line = message.lines().next().unwrap_or("");

    let breaking_notes: Vec<String> = message
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            line.strip_prefix("BREAKING CHANGE:")
                .or_else(|| line.strip_prefix("BREAKING-CHANGE:"))
                .map(|rest| rest.trim().to_string())
        })
        .filter(|note| !note.is_empty())
        .collect();

    let Some(caps) = CONVENTIONAL_SUBJECT.captures(first_line) else {
        return ConventionalParts {
            breaking_notes,
            ..Default::default()
        };
    };

    ConventionalParts {
        commit_type: caps.get(1).and_then(|m| m.as_str().parse().ok()),
        scope: caps.get(2).map(|m| m.as_str().to_string()),
        breaking_mark: caps.get(3).is_some(),
        breaking_notes,
    }
}

/// A commit found while walking a revision range.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredCommit {
    pub hash: String,
    pub subject: String,
    pub parent_count: usize,
}

impl DiscoveredCommit {
    fn from_git2_commit(commit: &Commit) -> Self {
        Self {
            hash: commit.id().to_string(),
            subject: commit.summary().unwrap_or("").to_string(),
            parent_count: commit.parent_count(),
        }
    }
}

/// Walk the range newest-first and return commits in discovery order.
pub fn discover_commits(
    repo: &Repository,
    range: &CommitRange,
) -> Result<Vec<DiscoveredCommit>, GitError> {
    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(GitError::RevwalkError)?;

    revwalk.push(range.to).map_err(GitError::RevwalkError)?;
    if let Some(from) = range.from {
        revwalk.hide(from).map_err(GitError::RevwalkError)?;
    }

    revwalk
        .map(|oid_result| {
            let oid: Oid = oid_result.map_err(GitError::RevwalkError)?;
            let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
            Ok(DiscoveredCommit::from_git2_commit(&commit))
        })
        .collect()
}
