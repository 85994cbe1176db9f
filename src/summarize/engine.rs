//! The per-commit summarization state machine.
//!
//! `NotSummarized -> AI attempt -> Summarized(AI | rule-based)`. One AI
//! attempt is made per commit; whatever retrying happens lives inside the
//! provider adapter.

use tracing::{debug, info, warn};

use crate::ingest::CommitAnalysis;
use crate::llm::{ChatCompletionProvider, CompletionOptions};

use super::fallback::rule_based_summary;
use super::metrics::Metrics;
use super::parse::parse_response;
use super::prompt::{AnalysisMode, SUMMARY_SCHEMA, build_messages};
use super::tier::resolve_model;
use super::validate::{CommitProfile, apply_corrections};
use super::{AiSummary, SummarizedCommit};

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerConfig {
    pub mode: AnalysisMode,
    /// Always wins over tier selection.
    pub model_override: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Standard,
            model_override: None,
            max_tokens: 1500,
            temperature: 0.2,
        }
    }
}

pub struct Summarizer<'a> {
    provider: Option<&'a dyn ChatCompletionProvider>,
    config: SummarizerConfig,
    notice_shown: bool,
}

impl<'a> Summarizer<'a> {
    /// `provider == None` runs the rule-based path for every commit.
    pub fn new(provider: Option<&'a dyn ChatCompletionProvider>, config: SummarizerConfig) -> Self {
        Self {
            provider,
            config,
            notice_shown: false,
        }
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    fn available_provider(&self) -> Option<&'a dyn ChatCompletionProvider> {
        self.provider.filter(|p| p.is_available())
    }

    fn show_unavailable_notice(&mut self) {
        if self.notice_shown {
            return;
        }
        self.notice_shown = true;
        info!("AI provider unavailable, using pattern-based analysis");
        eprintln!();
        eprintln!("\x1b[33m⚠ AI provider unavailable, using pattern-based analysis\x1b[0m");
        eprintln!("  Summaries are derived from file classification and commit tags.");
        eprintln!();
    }

    /// Summarize one commit. Never fails; the result is always corrected.
    pub async fn summarize(&mut self, analysis: &CommitAnalysis, metrics: &mut Metrics) -> AiSummary {
        let mut summary = match self.available_provider() {
            None => {
                self.show_unavailable_notice();
                metrics.record_unavailable();
                rule_based_summary(analysis)
            }
            Some(provider) => self.attempt(provider, analysis, metrics).await,
        };

        apply_corrections(&mut summary, &CommitProfile::from_analysis(analysis));
        summary
    }

    async fn attempt(
        &self,
        provider: &dyn ChatCompletionProvider,
        analysis: &CommitAnalysis,
        metrics: &mut Metrics,
    ) -> AiSummary {
        let model = resolve_model(provider, self.config.model_override.as_deref(), analysis);
        let messages = build_messages(analysis, self.config.mode);
        let options = CompletionOptions {
            model: Some(model),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_schema: Some(SUMMARY_SCHEMA),
        };

        match provider.generate_completion(&messages, &options).await {
            Ok(completion) => {
                metrics.record_api_call(completion.usage);
                debug!(
                    hash = %analysis.hash,
                    provider = provider.name(),
                    chars = completion.content.len(),
                    "Received completion"
                );
                parse_response(&completion.content, analysis)
            }
            Err(e) => {
                metrics.record_failure();
                warn!(
                    hash = %analysis.hash,
                    provider = provider.name(),
                    kind = e.failure_kind().as_str(),
                    error = %e,
                    "AI summarization failed, using rule-based summary"
                );
                rule_based_summary(analysis)
            }
        }
    }

    /// Summarize commits one after another, preserving input order.
    pub async fn summarize_all(
        &mut self,
        analyses: Vec<CommitAnalysis>,
        metrics: &mut Metrics,
    ) -> Vec<SummarizedCommit> {
        let mut out = Vec::with_capacity(analyses.len());
        for analysis in analyses {
            let summary = self.summarize(&analysis, metrics).await;
            out.push(SummarizedCommit { analysis, summary });
        }
        out
    }
}
