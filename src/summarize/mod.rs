//! AI-assisted commit summarization with a rule-based fallback.
//!
//! Every commit leaves this module with exactly one [`AiSummary`], either
//! parsed from a provider response or derived from classification signals.
//! Category and impact are always passed through the correction rules in
//! [`validate`], so the corrected values are authoritative.

pub mod engine;
pub mod fallback;
pub mod metrics;
pub mod parse;
pub mod prompt;
pub mod tier;
pub mod validate;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::classify::ChangeCategory;
use crate::ingest::CommitAnalysis;

pub use engine::{Summarizer, SummarizerConfig};
pub use fallback::rule_based_summary;
pub use metrics::{Metrics, MetricsReport};
pub use parse::parse_response;
pub use prompt::{AnalysisMode, build_messages};
pub use validate::{CommitProfile, validate_commit_category, validate_impact_assessment};

/// Impact of a commit. Declaration order is sort rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
    Unknown,
}

impl Impact {
    /// Sort rank: critical(0) through unknown(5).
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
            Impact::Minimal => "minimal",
            Impact::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Impact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Impact::Critical),
            "high" => Ok(Impact::High),
            "medium" | "moderate" => Ok(Impact::Medium),
            "low" => Ok(Impact::Low),
            "minimal" | "none" | "trivial" => Ok(Impact::Minimal),
            "unknown" => Ok(Impact::Unknown),
            _ => Err(format!("Unknown impact: {}", s)),
        }
    }
}

impl<'de> Deserialize<'de> for Impact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Impact>().map_err(serde::de::Error::custom)
    }
}

/// Where a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummarySource {
    #[serde(rename = "ai")]
    Ai,
    #[serde(rename = "rule-based")]
    RuleBased,
}

/// The summary attached to every analyzed commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    pub summary: String,
    pub category: ChangeCategory,
    pub impact: Impact,
    pub description: String,
    pub technical_details: String,
    pub business_value: String,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub highlights: Vec<String>,
    pub breaking_changes: bool,
    pub migration_required: bool,
    pub user_facing: bool,
    /// Model-reported confidence in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    pub source: SummarySource,
}

/// A commit paired with its summary, ready for assembly.
#[derive(Debug, Clone, Serialize)]
pub struct SummarizedCommit {
    pub analysis: CommitAnalysis,
    pub summary: AiSummary,
}
