//! Functional impact, risk, and business relevance heuristics.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::ingest::FileStatus;

use super::file::{FileCategory, categorize_file, count_changed_lines, is_manifest};

/// Lines that remove a public or exported signature.
static REMOVED_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^-\s*(pub(\([a-z]+\))?\s+(async\s+)?(fn|struct|enum|trait|type|const)\s|export\s+(default\s+)?(async\s+)?(function|class|const|interface|type)\s|public\s+\w+)",
    )
    .expect("removed signature pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactScope {
    Local,
    System,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// What a file change does to the running system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionalImpact {
    pub scope: ImpactScope,
    pub severity: Severity,
    pub affected_systems: BTreeSet<String>,
    pub backward_compatible: bool,
    pub migration_required: bool,
}

fn is_migration_path(lower: &str) -> bool {
    lower.contains("database/") || lower.contains("migrations/") || lower.contains("/migration")
}

/// Assess scope and severity of a single file change.
pub fn analyze_functional_impact(diff: &str, path: &str, status: FileStatus) -> FunctionalImpact {
    let lower = path.to_lowercase();
    let mut affected_systems = BTreeSet::new();

    let manifest = is_manifest(path);
    let migration = is_migration_path(&lower);
    let api = lower.contains("/api/") || lower.starts_with("api/");
    let server = lower.contains("/server/") || lower.starts_with("server/");

    if api {
        affected_systems.insert("api".to_string());
    }
    if server {
        affected_systems.insert("server".to_string());
    }
    if manifest {
        affected_systems.insert("dependencies".to_string());
    }
    if migration {
        affected_systems.insert("database".to_string());
    }
    if categorize_file(path) == FileCategory::Frontend || lower.contains("/components/") {
        affected_systems.insert("ui".to_string());
    }

    if status == FileStatus::Deleted {
        return FunctionalImpact {
            scope: ImpactScope::Global,
            severity: Severity::High,
            affected_systems,
            backward_compatible: false,
            migration_required: manifest || migration,
        };
    }

    let scope = if manifest || migration {
        ImpactScope::Global
    } else if api || server {
        ImpactScope::System
    } else {
        ImpactScope::Local
    };

    let (adds, dels) = count_changed_lines(diff);
    let changed = adds + dels;
    let severity = match scope {
        ImpactScope::Global => Severity::High,
        ImpactScope::System if changed > 100 => Severity::High,
        ImpactScope::System => Severity::Medium,
        ImpactScope::Local if changed > 200 => Severity::Medium,
        ImpactScope::Local => Severity::Low,
    };

    FunctionalImpact {
        scope,
        severity,
        affected_systems,
        backward_compatible: !REMOVED_SIGNATURE.is_match(diff),
        migration_required: manifest || migration,
    }
}

/// Overall risk level. Ordered from least to most risky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }
}

const HIGH_RISK_KEYWORDS: &[&str] = &[
    "breaking",
    "security",
    "vulnerability",
    "migration",
    "migrate",
    "drop",
    "delete",
    "remove",
    "deprecate",
    "critical",
    "hotfix",
    "rewrite",
    "auth",
    "password",
];

const INFRA_MARKERS: &[&str] = &[
    "dockerfile",
    "docker-compose",
    ".github/workflows",
    ".gitlab-ci",
    "terraform",
    "k8s/",
    "kubernetes",
    "helm/",
    "migrations/",
    ".env",
    "nginx",
];

const LARGE_DIFF_FILES: usize = 15;
const LARGE_DIFF_CHARS: usize = 10_000;

/// Paths named in `diff --git` / `+++` / `---` headers.
fn header_paths(diff: &str) -> impl Iterator<Item = &str> {
    diff.lines().filter_map(|line| {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            rest.split_whitespace().last().map(|p| p.trim_start_matches("b/"))
        } else if let Some(rest) = line.strip_prefix("+++ ").or_else(|| line.strip_prefix("--- ")) {
            let p = rest.trim();
            (p != "/dev/null").then(|| p.trim_start_matches("a/").trim_start_matches("b/"))
        } else {
            None
        }
    })
}

/// Risk from message keywords, touched manifests/infrastructure, and diff size.
///
/// Each independent signal escalates one level; nothing de-escalates.
pub fn assess_risk(diff: &str, file_count: usize, commit_message: &str) -> RiskLevel {
    let mut risk = RiskLevel::Low;

    let message = commit_message.to_lowercase();
    if HIGH_RISK_KEYWORDS.iter().any(|kw| message.contains(kw)) {
        risk = risk.escalate();
    }

    let touches_infra = header_paths(diff).any(|p| {
        let lower = p.to_lowercase();
        is_manifest(&lower) || INFRA_MARKERS.iter().any(|m| lower.contains(m))
    });
    if touches_infra {
        risk = risk.escalate();
    }

    if file_count > LARGE_DIFF_FILES || diff.len() > LARGE_DIFF_CHARS {
        risk = risk.escalate();
    }

    risk
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessRelevance {
    Low,
    Medium,
    High,
}

const BUSINESS_KEYWORDS: &[&str] = &[
    "customer",
    "user",
    "payment",
    "billing",
    "checkout",
    "pricing",
    "revenue",
    "subscription",
    "invoice",
    "order",
    "onboarding",
    "signup",
];

const BUSINESS_PATH_SEGMENTS: &[&str] = &[
    "billing",
    "payment",
    "payments",
    "checkout",
    "pricing",
    "orders",
    "customer",
    "customers",
    "account",
    "accounts",
    "subscription",
    "subscriptions",
    "cart",
    "invoice",
    "invoices",
];

/// `High` needs both a business keyword and a business path; either gives `Medium`.
pub fn assess_business_relevance<S: AsRef<str>>(message: &str, paths: &[S]) -> BusinessRelevance {
    let lower = message.to_lowercase();
    let keyword = BUSINESS_KEYWORDS.iter().any(|kw| lower.contains(kw));
    let path_hit = paths.iter().any(|p| {
        p.as_ref()
            .to_lowercase()
            .split(['/', '.', '_', '-'])
            .any(|segment| BUSINESS_PATH_SEGMENTS.contains(&segment))
    });

    match (keyword, path_hit) {
        (true, true) => BusinessRelevance::High,
        (true, false) | (false, true) => BusinessRelevance::Medium,
        (false, false) => BusinessRelevance::Low,
    }
}
