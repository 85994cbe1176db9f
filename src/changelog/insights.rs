//! Release-level aggregates over summarized commits.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use serde::Serialize;

use crate::classify::file::is_manifest;
use crate::classify::{ChangeCategory, ComplexityLevel, FileCategory, RiskLevel};
use crate::summarize::SummarizedCommit;

/// Aggregate signals rendered above the commit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInsights {
    pub total_commits: usize,
    /// Categories by descending commit count, ties in first-seen order.
    pub dominant_types: Vec<(ChangeCategory, usize)>,
    pub overall_risk: RiskLevel,
    pub highest_risk: RiskLevel,
    pub overall_complexity: ComplexityLevel,
    pub breaking_changes: usize,
    pub deployment_requirements: Vec<String>,
}

/// Most frequent value; ties resolve toward the greater value.
fn mode<T: Copy + Ord + Hash>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: HashMap<T, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then(a.cmp(b)))
        .map(|(value, _)| value)
}

fn dominant_types(commits: &[SummarizedCommit]) -> Vec<(ChangeCategory, usize)> {
    let mut counts: Vec<(ChangeCategory, usize)> = Vec::new();
    for commit in commits {
        match counts.iter_mut().find(|(c, _)| *c == commit.summary.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((commit.summary.category, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn deployment_requirements(commits: &[SummarizedCommit]) -> Vec<String> {
    let mut requirements = BTreeSet::new();
    for commit in commits {
        let files = &commit.analysis.files;
        if commit.summary.migration_required
            || files
                .iter()
                .any(|f| f.classification.functional_impact.migration_required && !is_manifest(&f.path))
        {
            requirements.insert("Run database or data migrations");
        }
        if files.iter().any(|f| is_manifest(&f.path)) {
            requirements.insert("Install updated dependencies");
        }
        if files.iter().any(|f| f.category() == FileCategory::Configuration && !is_manifest(&f.path)) {
            requirements.insert("Review configuration changes");
        }
        if commit.summary.breaking_changes {
            requirements.insert("Coordinate the rollout of breaking changes with consumers");
        }
    }
    requirements.into_iter().map(str::to_string).collect()
}

impl ReleaseInsights {
    pub fn from_commits(commits: &[SummarizedCommit]) -> Self {
        let risks = commits.iter().map(|c| c.analysis.risk);
        Self {
            total_commits: commits.len(),
            dominant_types: dominant_types(commits),
            overall_risk: mode(risks.clone()).unwrap_or(RiskLevel::Low),
            highest_risk: risks.max().unwrap_or(RiskLevel::Low),
            overall_complexity: mode(commits.iter().map(|c| c.analysis.complexity.level))
                .unwrap_or(ComplexityLevel::Low),
            breaking_changes: commits.iter().filter(|c| c.summary.breaking_changes).count(),
            deployment_requirements: deployment_requirements(commits),
        }
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.breaking_changes > 0
    }
}
