//! Prompt construction for commit summarization.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::classify::FileCategory;
use crate::ingest::{CommitAnalysis, FileStatus};
use crate::llm::ChatMessage;

/// Per-file diff excerpt limit in the prompt.
const MAX_EXCERPT_CHARS: usize = 1500;
const MAX_EXCERPT_LINES: usize = 50;
/// Files listed with excerpts before the rest are only counted.
const MAX_EXCERPT_FILES: usize = 12;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("ansi escape pattern"));

const SYSTEM_ROLE: &str = "You are a senior release engineer who writes precise, factual changelog \
entries from git commits. You only describe what the diff shows and you always answer with a single JSON object.";

/// JSON schema for CLIs that can enforce structured output.
pub const SUMMARY_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "summary": {"type": "string"},
    "category": {"type": "string", "enum": ["feature", "fix", "refactor", "docs", "test", "perf", "security", "build", "ci", "style", "chore", "merge", "other"]},
    "impact": {"type": "string", "enum": ["critical", "high", "medium", "low", "minimal"]},
    "description": {"type": "string"},
    "technicalDetails": {"type": "string"},
    "businessValue": {"type": "string"},
    "riskFactors": {"type": "array", "items": {"type": "string"}},
    "recommendations": {"type": "array", "items": {"type": "string"}},
    "highlights": {"type": "array", "items": {"type": "string"}},
    "breakingChanges": {"type": "boolean"},
    "migrationRequired": {"type": "boolean"},
    "userFacing": {"type": "boolean"},
    "confidence": {"type": "number"}
  },
  "required": ["summary", "category", "impact"]
}"#;

/// Depth of analysis requested from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalysisMode {
    #[default]
    Standard,
    Detailed,
    Enterprise,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Standard => "standard",
            AnalysisMode::Detailed => "detailed",
            AnalysisMode::Enterprise => "enterprise",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            AnalysisMode::Standard => {
                "Write a concise summary focused on what changed and why it matters to users."
            }
            AnalysisMode::Detailed => {
                "Write a thorough technical analysis: explain the implementation approach, notable \
code paths touched, and any edge cases the change introduces."
            }
            AnalysisMode::Enterprise => {
                "Write for a release board: emphasize business value, operational risk, deployment \
and migration requirements, and compliance-relevant changes."
            }
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(AnalysisMode::Standard),
            "detailed" => Ok(AnalysisMode::Detailed),
            "enterprise" => Ok(AnalysisMode::Enterprise),
            _ => Err(format!("Unknown analysis mode: {}", s)),
        }
    }
}

/// Neutralize prompt-injection vectors and bound the size of untrusted text.
pub fn sanitize_for_prompt(text: &str, max_chars: usize) -> String {
    let stripped = ANSI_ESCAPE.replace_all(text, "");
    let cleaned: String = stripped
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let fenced = cleaned
        .replace("```", "'''")
        .replace("##", "//")
        .lines()
        .take(MAX_EXCERPT_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    match fenced.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\n... [truncated]", &fenced[..idx]),
        None => fenced,
    }
}

/// Observations about the shape of the change set.
fn bulk_patterns(analysis: &CommitAnalysis) -> Vec<String> {
    let mut patterns = Vec::new();
    let mut by_category: BTreeMap<FileCategory, usize> = BTreeMap::new();
    for file in &analysis.files {
        *by_category.entry(file.category()).or_default() += 1;
    }
    for (category, count) in by_category {
        if count > 5 {
            patterns.push(format!("{} {} files changed", count, category.as_str()));
        }
    }

    let added = analysis.added_files();
    if added > 5 {
        patterns.push(format!("bulk addition of {} new files", added));
    }
    let renamed = analysis
        .files
        .iter()
        .filter(|f| f.status == FileStatus::Renamed)
        .count();
    if renamed > 3 {
        patterns.push(format!("{} files renamed or moved", renamed));
    }
    if added > 1 && analysis.diff_stats.insertions > 1000 {
        patterns.push(format!(
            "multi-file addition of {} lines",
            analysis.diff_stats.insertions
        ));
    }
    patterns
}

fn file_section(analysis: &CommitAnalysis) -> String {
    if let Some(digest) = analysis.merge_digest() {
        return format!("## Merge digest\n{}", digest);
    }

    let mut out = String::from("## Files");
    for file in analysis.files.iter().take(MAX_EXCERPT_FILES) {
        let patterns: Vec<&str> = file
            .classification
            .semantic_patterns
            .iter()
            .map(String::as_str)
            .collect();
        out.push_str(&format!(
            "\n\n### {} ({}, {}, +{} -{})",
            file.path,
            file.status,
            file.classification.language,
            file.additions,
            file.deletions
        ));
        if !patterns.is_empty() {
            out.push_str(&format!("\nPatterns: {}", patterns.join(", ")));
        }
        out.push_str(&format!(
            "\n'''\n{}\n'''",
            sanitize_for_prompt(&file.diff, MAX_EXCERPT_CHARS)
        ));
    }
    if analysis.files.len() > MAX_EXCERPT_FILES {
        out.push_str(&format!(
            "\n\n...and {} more files",
            analysis.files.len() - MAX_EXCERPT_FILES
        ));
    }
    out
}

/// Build the system and user messages for one commit.
pub fn build_messages(analysis: &CommitAnalysis, mode: AnalysisMode) -> Vec<ChatMessage> {
    let subject = sanitize_for_prompt(&analysis.subject, 300);
    let body = sanitize_for_prompt(&analysis.body, 1000);
    let stats = &analysis.diff_stats;

    let patterns = bulk_patterns(analysis);
    let patterns_block = if patterns.is_empty() {
        "none".to_string()
    } else {
        patterns
            .iter()
            .map(|p| format!("- {}", p))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body_block = if body.is_empty() {
        String::new()
    } else {
        format!("\nMessage body:\n{}\n", body)
    };

    let user = format!(
        r#"{instruction}

## Commit
Subject: {subject}
{body_block}
Files changed: {files} ({added} added)
Lines: +{insertions} -{deletions}
Merge commit: {merge}

## Bulk patterns
{patterns_block}

{file_section}

## Categorization rules
1. A commit that adds more than 1000 lines across multiple files is never "fix".
2. A commit that adds new source modules is "feature", not "fix".
3. A commit whose subject contains "merge" is always "merge".
4. A commit touching only markdown, README or CHANGELOG files is "docs".
5. A commit touching only test files is "test".
6. Documentation-only changes are never "critical" or "high" impact.

## Response
Respond with a single JSON object only:
{{
  "summary": "one line, imperative mood",
  "category": "feature|fix|refactor|docs|test|perf|security|build|ci|style|chore|merge|other",
  "impact": "critical|high|medium|low|minimal",
  "description": "...",
  "technicalDetails": "...",
  "businessValue": "...",
  "riskFactors": ["..."],
  "recommendations": ["..."],
  "highlights": ["..."],
  "breakingChanges": false,
  "migrationRequired": false,
  "userFacing": true,
  "confidence": 85
}}"#,
        instruction = mode.instruction(),
        files = analysis.file_count(),
        added = analysis.added_files(),
        insertions = stats.insertions,
        deletions = stats.deletions,
        merge = analysis.merge_commit,
        file_section = file_section(analysis),
    );

    vec![ChatMessage::system(SYSTEM_ROLE), ChatMessage::user(user)]
}
