//! Turning free-form provider output into an [`AiSummary`].
//!
//! Category and impact parsed here are suggestions; the engine always runs
//! them through [`super::validate`].

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;
use tracing::debug;

use crate::classify::{ChangeCategory, dominant_category, is_user_facing};
use crate::ingest::CommitAnalysis;
use crate::llm::locate_json_object;

use super::{AiSummary, Impact, SummarySource};

static IMPACT_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)impact\W{0,5}(critical|high|medium|moderate|low|minimal)")
        .expect("impact pattern")
});

static CATEGORY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:category|type)\W{0,5}(feature|feat|fix|bugfix|refactor|docs|documentation|test|tests|perf|performance|security|build|ci|style|chore|merge)\b",
    )
    .expect("category pattern")
});

/// First present, non-null value among `keys`.
///
/// Fields are read one at a time so a malformed or duplicated key only loses
/// that field, never the whole response.
fn field<'v>(value: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .filter_map(|k| value.get(k))
        .find(|v| !v.is_null())
}

/// A trimmed, non-empty string, or the first usable string of an array.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.iter().find_map(|v| text(Some(v))),
        _ => None,
    }
}

/// Booleans also arrive as `"yes"`/`"no"` or `"true"`/`"false"`.
fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "required" => Some(true),
            "false" | "no" | "n" | "none" | "" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// Accepts a string array, a single string, or nothing.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| text(Some(v))).collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// `breakingChanges` arrives as a bool, a list of notes, or a sentence.
fn breaking_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Array(items) => Some(!items.is_empty()),
        Value::String(s) => {
            let lower = s.trim().to_lowercase();
            Some(!(lower.is_empty() || lower == "none" || lower == "false" || lower == "no"))
        }
        _ => None,
    }
}

/// Confidence as a percentage; fractions in `0..=1` are scaled.
fn confidence_percent(value: Option<&Value>) -> Option<u8> {
    let raw = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    let percent = if raw > 0.0 && raw <= 1.0 { raw * 100.0 } else { raw };
    (0.0..=100.0)
        .contains(&percent)
        .then(|| percent.round() as u8)
}

fn from_json(value: Value, analysis: &CommitAnalysis) -> AiSummary {
    let summary = text(field(&value, &["summary"])).unwrap_or_else(|| analysis.subject.clone());
    let category = text(field(&value, &["category", "type"]))
        .and_then(|c| c.parse::<ChangeCategory>().ok())
        .unwrap_or_else(|| dominant_category(&analysis.tags));
    let impact = text(field(&value, &["impact"]))
        .and_then(|i| i.parse::<Impact>().ok())
        .unwrap_or(Impact::Unknown);
    let breaking = breaking_flag(field(
        &value,
        &["breakingChanges", "breaking_changes", "breaking"],
    ));

    AiSummary {
        description: text(field(&value, &["description"])).unwrap_or_else(|| summary.clone()),
        summary,
        category,
        impact,
        technical_details: text(field(&value, &["technicalDetails", "technical_details"]))
            .unwrap_or_default(),
        business_value: text(field(&value, &["businessValue", "business_value"]))
            .unwrap_or_default(),
        risk_factors: string_list(field(&value, &["riskFactors", "risk_factors"])),
        recommendations: string_list(field(&value, &["recommendations"])),
        highlights: string_list(field(&value, &["highlights"])),
        breaking_changes: breaking.unwrap_or(false) || analysis.has_breaking_changes(),
        migration_required: flag(field(&value, &["migrationRequired", "migration_required"]))
            .unwrap_or(false),
        user_facing: flag(field(&value, &["userFacing", "user_facing"]))
            .unwrap_or_else(|| is_user_facing(&analysis.tags)),
        confidence: confidence_percent(field(&value, &["confidence"])),
        source: SummarySource::Ai,
    }
}

/// Degraded parse for responses without any JSON object.
fn from_text(content: &str, analysis: &CommitAnalysis) -> AiSummary {
    let lower = content.to_lowercase();
    let impact = IMPACT_WORD
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<Impact>().ok())
        .unwrap_or(Impact::Unknown);
    let category = CATEGORY_WORD
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<ChangeCategory>().ok())
        .unwrap_or_else(|| dominant_category(&analysis.tags));

    let breaking = (lower.contains("breaking") && !lower.contains("no breaking"))
        || analysis.has_breaking_changes();
    let migration = lower.contains("migration") && !lower.contains("no migration");

    let summary = content
        .lines()
        .map(|l| l.trim().trim_start_matches(['#', '-', '*', ' ']).trim())
        .find(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| analysis.subject.clone());

    AiSummary {
        description: summary.clone(),
        summary,
        category,
        impact,
        technical_details: String::new(),
        business_value: String::new(),
        risk_factors: Vec::new(),
        recommendations: Vec::new(),
        highlights: Vec::new(),
        breaking_changes: breaking,
        migration_required: migration,
        user_facing: is_user_facing(&analysis.tags),
        confidence: None,
        source: SummarySource::Ai,
    }
}

/// Parse a provider response. Never fails: missing data is filled from the commit.
pub fn parse_response(content: &str, analysis: &CommitAnalysis) -> AiSummary {
    match locate_json_object(content) {
        Some(value) => from_json(value, analysis),
        None => {
            debug!(hash = %analysis.hash, "No JSON object in response, sniffing text");
            from_text(content, analysis)
        }
    }
}
