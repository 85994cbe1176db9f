//! Deterministic summary built only from classification signals.

use std::collections::BTreeSet;

use crate::classify::{Importance, RiskLevel, dominant_category, is_user_facing};
use crate::ingest::CommitAnalysis;

use super::{AiSummary, Impact, SummarySource};

const MAX_HIGHLIGHTS: usize = 5;

fn impact_from_importance(analysis: &CommitAnalysis) -> Impact {
    if analysis.files.is_empty() {
        return Impact::Minimal;
    }
    match analysis.importance {
        Importance::Critical => Impact::Critical,
        Importance::High => Impact::High,
        Importance::Medium => Impact::Medium,
        Importance::Low => Impact::Low,
    }
}

fn highlights(analysis: &CommitAnalysis) -> Vec<String> {
    if let Some(digest) = analysis.merge_digest() {
        return digest
            .lines()
            .filter_map(|line| line.strip_prefix("- "))
            .take(MAX_HIGHLIGHTS)
            .map(str::to_string)
            .collect();
    }

    let patterns: BTreeSet<&str> = analysis
        .files
        .iter()
        .flat_map(|f| f.classification.semantic_patterns.iter().map(String::as_str))
        .collect();
    patterns
        .into_iter()
        .take(MAX_HIGHLIGHTS)
        .map(|p| format!("Detected {} changes", p.replace('-', " ")))
        .collect()
}

fn risk_factors(analysis: &CommitAnalysis) -> Vec<String> {
    let mut factors: Vec<String> = analysis
        .breaking_changes
        .iter()
        .map(|b| format!("Breaking: {}", b))
        .collect();
    if analysis.risk >= RiskLevel::High {
        factors.push(format!("{} risk change set", analysis.risk.as_str()));
    }
    factors
}

fn recommendations(analysis: &CommitAnalysis, migration_required: bool) -> Vec<String> {
    let mut recs = Vec::new();
    if migration_required {
        recs.push("Review dependency and migration changes before deploying".to_string());
    }
    if analysis.has_breaking_changes() {
        recs.push("Communicate the breaking change to downstream consumers".to_string());
    }
    if analysis.risk >= RiskLevel::High {
        recs.push("Test thoroughly before release".to_string());
    }
    recs
}

/// Build a complete summary without any provider.
pub fn rule_based_summary(analysis: &CommitAnalysis) -> AiSummary {
    let file_count = analysis.file_count();
    let migration_required = analysis
        .files
        .iter()
        .any(|f| f.classification.functional_impact.migration_required);
    let languages: BTreeSet<&str> = analysis
        .files
        .iter()
        .map(|f| f.classification.language.as_str())
        .filter(|l| !l.is_empty() && *l != "Unknown")
        .collect();

    let technical_details = format!(
        "{} files changed, +{} -{} lines{}; {} complexity",
        file_count,
        analysis.diff_stats.insertions,
        analysis.diff_stats.deletions,
        if languages.is_empty() {
            String::new()
        } else {
            format!(" ({})", languages.into_iter().collect::<Vec<_>>().join(", "))
        },
        analysis.complexity.level.as_str()
    );

    let description = if analysis.body.is_empty() {
        analysis.subject.clone()
    } else {
        analysis.body.lines().next().unwrap_or_default().trim().to_string()
    };

    AiSummary {
        summary: format!("{} ({} files changed)", analysis.subject, file_count),
        category: dominant_category(&analysis.tags),
        impact: impact_from_importance(analysis),
        description,
        technical_details,
        business_value: format!("{:?} business relevance", analysis.business_relevance),
        risk_factors: risk_factors(analysis),
        recommendations: recommendations(analysis, migration_required),
        highlights: highlights(analysis),
        breaking_changes: analysis.has_breaking_changes(),
        migration_required,
        user_facing: is_user_facing(&analysis.tags),
        confidence: None,
        source: SummarySource::RuleBased,
    }
}
