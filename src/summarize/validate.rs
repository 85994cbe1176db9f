//! Correction rules that override an untrusted category or impact.

use tracing::debug;

use crate::classify::ChangeCategory;
use crate::classify::file::{FileCategory, is_prose_document, is_test_file};
use crate::ingest::{CommitAnalysis, FileStatus};

use super::{AiSummary, Impact};

/// Raw file and line-count signals the corrections are judged against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitProfile {
    pub file_count: usize,
    pub added_files: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub new_source_modules: usize,
    pub docs_only: bool,
    pub tests_only: bool,
    pub merge: bool,
    /// Subject or footer carries explicit breaking-change markup.
    pub explicit_breaking: bool,
}

impl CommitProfile {
    pub fn from_analysis(analysis: &CommitAnalysis) -> Self {
        let files = &analysis.files;
        Self {
            file_count: analysis.file_count(),
            added_files: analysis.added_files(),
            insertions: analysis.diff_stats.insertions,
            deletions: analysis.diff_stats.deletions,
            new_source_modules: files
                .iter()
                .filter(|f| f.status == FileStatus::Added && f.category() == FileCategory::Source)
                .count(),
            docs_only: !files.is_empty() && files.iter().all(|f| is_prose_document(&f.path)),
            tests_only: !files.is_empty() && files.iter().all(|f| is_test_file(&f.path)),
            merge: analysis.merge_commit,
            explicit_breaking: analysis.conventional.is_breaking()
                || analysis.subject.to_lowercase().contains("breaking"),
        }
    }

    pub fn total_changes(&self) -> usize {
        self.insertions + self.deletions
    }
}

/// Correct a suggested category against the commit's shape.
///
/// The docs-only and tests-only overrides run last and beat every other rule.
pub fn validate_commit_category(category: ChangeCategory, profile: &CommitProfile) -> ChangeCategory {
    let mut category = category;

    if category == ChangeCategory::Fix
        && (profile.file_count > 10 || profile.added_files > 5 || profile.insertions > 1000)
    {
        category = if profile.deletions as f64 > profile.insertions as f64 * 0.5 {
            ChangeCategory::Refactor
        } else {
            ChangeCategory::Feature
        };
    }

    if category == ChangeCategory::Fix && profile.new_source_modules > 0 {
        category = ChangeCategory::Feature;
    }

    if profile.merge {
        category = ChangeCategory::Merge;
    }

    if profile.docs_only {
        category = ChangeCategory::Docs;
    } else if profile.tests_only {
        category = ChangeCategory::Test;
    }

    category
}

/// Correct a suggested impact against the commit's size.
pub fn validate_impact_assessment(impact: Impact, profile: &CommitProfile) -> Impact {
    if profile.docs_only {
        return match impact {
            Impact::Critical | Impact::High => Impact::Low,
            other => other,
        };
    }

    let total = profile.total_changes();
    let mut impact = impact;

    if matches!(impact, Impact::Minimal | Impact::Low) && (profile.file_count > 50 || total > 5000) {
        impact = Impact::High;
    }

    if impact == Impact::Minimal
        && (profile.file_count > 20 || total > 2000 || profile.added_files > 10)
    {
        impact = Impact::Medium;
    }

    if matches!(impact, Impact::Critical | Impact::High)
        && profile.file_count <= 3
        && total <= 100
        && !profile.explicit_breaking
    {
        impact = Impact::Medium;
    }

    impact
}

/// Apply both corrections in place.
pub fn apply_corrections(summary: &mut AiSummary, profile: &CommitProfile) {
    let category = validate_commit_category(summary.category, profile);
    if category != summary.category {
        debug!(from = %summary.category, to = %category, "Corrected category");
        summary.category = category;
    }

    let impact = validate_impact_assessment(summary.impact, profile);
    if impact != summary.impact {
        debug!(from = %summary.impact, to = %impact, "Corrected impact");
        summary.impact = impact;
    }
}
