//! Changelog assembly and rendering.
//!
//! Everything here is pure: the caller supplies the date and writes the
//! rendered text wherever it wants.

use chrono::NaiveDate;
use semver::Version;
use serde::Serialize;

use crate::error::ChangelogError;
use crate::summarize::{AiSummary, Impact, MetricsReport, SummarizedCommit};

use super::insights::ReleaseInsights;

/// Shown when the model did not report a confidence.
pub const DEFAULT_CONFIDENCE: u8 = 85;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// `None` renders as "Unreleased".
    pub version: Option<Version>,
    pub date: NaiveDate,
    pub format: OutputFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            version: None,
            date: chrono::Utc::now().date_naive(),
            format: OutputFormat::Markdown,
        }
    }
}

/// One rendered commit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    pub hash: String,
    pub short_hash: String,
    pub subject: String,
    pub author: String,
    pub date: String,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
    #[serde(flatten)]
    pub summary: AiSummary,
}

impl From<&SummarizedCommit> for ChangelogEntry {
    fn from(commit: &SummarizedCommit) -> Self {
        let analysis = &commit.analysis;
        Self {
            hash: analysis.hash.clone(),
            short_hash: analysis.short_hash().to_string(),
            subject: analysis.subject.clone(),
            author: analysis.author.clone(),
            date: analysis.date.clone(),
            files_changed: analysis.file_count(),
            insertions: analysis.diff_stats.insertions,
            deletions: analysis.diff_stats.deletions,
            summary: commit.summary.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogDocument {
    pub version: String,
    pub date: String,
    pub insights: ReleaseInsights,
    pub entries: Vec<ChangelogEntry>,
    pub metrics: MetricsReport,
}

/// Breaking changes first, then by impact rank. Equal keys keep input order.
pub fn sort_for_changelog(commits: &mut [SummarizedCommit]) {
    commits.sort_by_key(|c| (!c.summary.breaking_changes, c.summary.impact.rank()));
}

/// Sort and assemble. Commits are expected in discovery order.
pub fn assemble_changelog(
    mut commits: Vec<SummarizedCommit>,
    metrics: MetricsReport,
    options: &RenderOptions,
) -> ChangelogDocument {
    sort_for_changelog(&mut commits);
    ChangelogDocument {
        version: options
            .version
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "Unreleased".to_string()),
        date: options.date.format("%Y-%m-%d").to_string(),
        insights: ReleaseInsights::from_commits(&commits),
        entries: commits.iter().map(ChangelogEntry::from).collect(),
        metrics,
    }
}

/// `- (<type>) <summary>[ ⚠️ BREAKING][ 🔥 <impact>] - <details> (<hash>) (<confidence>%)`
pub fn format_entry_line(entry: &ChangelogEntry) -> String {
    let summary = &entry.summary;
    let mut line = format!("- ({}) {}", summary.category, summary.summary);
    if summary.breaking_changes {
        line.push_str(" ⚠️ BREAKING");
    }
    if matches!(summary.impact, Impact::Critical | Impact::High) {
        line.push_str(&format!(" 🔥 {}", summary.impact));
    }

    let details = if summary.technical_details.trim().is_empty() {
        summary.description.trim()
    } else {
        summary.technical_details.trim()
    };
    if !details.is_empty() {
        line.push_str(" - ");
        line.push_str(details);
    }

    line.push_str(&format!(
        " ({}) ({}%)",
        entry.short_hash,
        summary.confidence.unwrap_or(DEFAULT_CONFIDENCE)
    ));
    line
}

fn format_insights(insights: &ReleaseInsights) -> String {
    let mut out = String::from("### Release Insights\n\n");
    out.push_str(&format!("- Total commits: {}\n", insights.total_commits));
    if !insights.dominant_types.is_empty() {
        let types: Vec<String> = insights
            .dominant_types
            .iter()
            .map(|(category, count)| format!("{} ({})", category, count))
            .collect();
        out.push_str(&format!("- Change types: {}\n", types.join(", ")));
    }
    out.push_str(&format!(
        "- Overall complexity: {}\n",
        insights.overall_complexity.as_str()
    ));
    out.push_str(&format!(
        "- Risk level: {} (highest: {})\n",
        insights.overall_risk.as_str(),
        insights.highest_risk.as_str()
    ));
    if insights.has_breaking_changes() {
        out.push_str(&format!(
            "- ⚠️ **{} breaking change{} in this release**\n",
            insights.breaking_changes,
            if insights.breaking_changes == 1 { "" } else { "s" }
        ));
    }
    if !insights.deployment_requirements.is_empty() {
        out.push_str("- Deployment requirements:\n");
        for requirement in &insights.deployment_requirements {
            out.push_str(&format!("  - {}\n", requirement));
        }
    }
    out
}

pub fn render_markdown(doc: &ChangelogDocument) -> String {
    let mut out = format!("## [{}] - {}\n\n", doc.version, doc.date);
    out.push_str(&format_insights(&doc.insights));
    out.push('\n');

    out.push_str("### Changes\n\n");
    if doc.entries.is_empty() {
        out.push_str("No changes found.\n");
    }
    for entry in &doc.entries {
        out.push_str(&format_entry_line(entry));
        out.push('\n');
        for highlight in &entry.summary.highlights {
            out.push_str(&format!("  - {}\n", highlight));
        }
        if entry.summary.migration_required {
            out.push_str("  - Migration required: review before deploying\n");
        }
    }
    out
}

pub fn render_json(doc: &ChangelogDocument) -> Result<String, ChangelogError> {
    serde_json::to_string_pretty(doc).map_err(ChangelogError::SerializeFailed)
}

pub fn render(doc: &ChangelogDocument, format: OutputFormat) -> Result<String, ChangelogError> {
    match format {
        OutputFormat::Markdown => Ok(render_markdown(doc)),
        OutputFormat::Json => render_json(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ChangeCategory;
    use crate::ingest::{CommitAnalysis, CommitMeta};
    use crate::summarize::SummarySource;

    fn summarized(hash: &str, impact: Impact, breaking: bool) -> SummarizedCommit {
        let meta = CommitMeta {
            hash: hash.to_string(),
            subject: format!("change {}", hash),
            ..Default::default()
        };
        SummarizedCommit {
            analysis: CommitAnalysis::assemble(meta, Vec::new(), None),
            summary: AiSummary {
                summary: format!("Summary {}", hash),
                category: ChangeCategory::Feature,
                impact,
                description: "desc".to_string(),
                technical_details: String::new(),
                business_value: String::new(),
                risk_factors: Vec::new(),
                recommendations: Vec::new(),
                highlights: Vec::new(),
                breaking_changes: breaking,
                migration_required: false,
                user_facing: true,
                confidence: None,
                source: SummarySource::Ai,
            },
        }
    }

    fn options() -> RenderOptions {
        RenderOptions {
            version: Some(Version::new(1, 2, 0)),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            format: OutputFormat::Markdown,
        }
    }

    #[test]
    fn test_sort_is_stable_for_equal_rank() {
        let mut commits = vec![
            summarized("aaa", Impact::Low, false),
            summarized("bbb", Impact::Low, false),
            summarized("ccc", Impact::Unknown, false),
            summarized("ddd", Impact::Low, true),
        ];
        sort_for_changelog(&mut commits);
        let order: Vec<&str> = commits.iter().map(|c| c.analysis.hash.as_str()).collect();
        assert_eq!(order, vec!["ddd", "aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_entry_line_format() {
        let mut commit = summarized("0123456789", Impact::High, true);
        commit.summary.technical_details = "Rewrites the parser".to_string();
        commit.summary.confidence = Some(92);
        let line = format_entry_line(&ChangelogEntry::from(&commit));
        assert_eq!(
            line,
            "- (feature) Summary 0123456789 ⚠️ BREAKING 🔥 high - Rewrites the parser (0123456) (92%)"
        );
    }

    #[test]
    fn test_entry_line_defaults() {
        let commit = summarized("abcdef12", Impact::Medium, false);
        let line = format_entry_line(&ChangelogEntry::from(&commit));
        assert_eq!(line, "- (feature) Summary abcdef12 - desc (abcdef1) (85%)");
    }

    #[test]
    fn test_markdown_heading_and_sub_bullets() {
        let mut commit = summarized("abcdef12", Impact::Medium, false);
        commit.summary.highlights = vec!["first".to_string(), "second".to_string()];
        commit.summary.migration_required = true;
        let doc = assemble_changelog(vec![commit], MetricsReport::default(), &options());
        let md = render_markdown(&doc);
        assert!(md.starts_with("## [1.2.0] - 2024-05-01\n"));
        assert!(md.contains("### Release Insights"));
        assert!(md.contains("- Total commits: 1"));
        assert!(md.contains("  - first\n  - second\n"));
        assert!(md.contains("  - Migration required"));
    }

    #[test]
    fn test_unreleased_heading() {
        let doc = assemble_changelog(
            Vec::new(),
            MetricsReport::default(),
            &RenderOptions {
                version: None,
                ..options()
            },
        );
        assert!(render_markdown(&doc).starts_with("## [Unreleased] - 2024-05-01"));
    }

    #[test]
    fn test_json_includes_metrics_and_summary_fields() {
        let doc = assemble_changelog(
            vec![summarized("abcdef12", Impact::Low, false)],
            MetricsReport::default(),
            &options(),
        );
        let json: serde_json::Value = serde_json::from_str(&render_json(&doc).unwrap()).unwrap();
        assert_eq!(json["version"], "1.2.0");
        assert_eq!(json["entries"][0]["impact"], "low");
        assert_eq!(json["entries"][0]["shortHash"], "abcdef1");
        assert!(json["metrics"].get("apiCalls").is_some());
    }
}
