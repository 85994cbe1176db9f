//! Pure, deterministic classification of files and change sets.
//!
//! Every function here depends only on its arguments (path, diff text,
//! status, message), so results can be reused for prompt construction and for
//! the rule-based fallback alike.

pub mod file;
pub mod impact;
pub mod semantic;
pub mod tags;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ingest::FileStatus;

pub use file::{
    Complexity, ComplexityLevel, FileCategory, Importance, assess_change_complexity,
    assess_file_importance, categorize_file, complexity_for_lines, detect_language,
};
pub use impact::{
    BusinessRelevance, FunctionalImpact, ImpactScope, RiskLevel, Severity,
    analyze_functional_impact, assess_business_relevance, assess_risk,
};
pub use semantic::analyze_semantic_changes;
pub use tags::{ChangeCategory, CommitTag, dominant_category, is_user_facing, tag_commit};

/// All classification signals for one file change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub category: FileCategory,
    pub language: String,
    pub importance: Importance,
    pub complexity: Complexity,
    pub semantic_patterns: BTreeSet<String>,
    pub functional_impact: FunctionalImpact,
}

/// Run every file-level classifier over one change.
pub fn classify_file(path: &str, diff: &str, status: FileStatus) -> ClassificationResult {
    ClassificationResult {
        category: categorize_file(path),
        language: detect_language(path).to_string(),
        importance: assess_file_importance(path, status),
        complexity: assess_change_complexity(diff),
        semantic_patterns: analyze_semantic_changes(diff, path),
        functional_impact: analyze_functional_impact(diff, path, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_file_combines_signals() {
        let diff = "+export async function GET() {\n+  return fetch('/x')\n+}\n";
        let result = classify_file("src/api/items.ts", diff, FileStatus::Added);
        assert_eq!(result.category, FileCategory::Source);
        assert_eq!(result.language, "TypeScript");
        assert_eq!(result.importance, Importance::High);
        assert_eq!(result.complexity.score, 1);
        assert!(result.semantic_patterns.contains("api-get"));
        assert_eq!(result.functional_impact.scope, ImpactScope::System);
    }

    #[test]
    fn classify_file_is_deterministic() {
        let diff = "-old\n+new\n";
        assert_eq!(
            classify_file("lib/main.py", diff, FileStatus::Modified),
            classify_file("lib/main.py", diff, FileStatus::Modified)
        );
    }
}
