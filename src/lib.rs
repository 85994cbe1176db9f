//! changescribe - turns git history into a classified, AI-summarized changelog.
//!
//! # Overview
//!
//! Each commit in a range (or the uncommitted working tree) is ingested into
//! per-file diffs, classified with deterministic heuristics, summarized by a
//! chat-completion provider or a rule-based fallback, and assembled into a
//! changelog ordered by breaking status and impact.

pub mod changelog;
pub mod classify;
pub mod error;
pub mod git;
pub mod ingest;
pub mod llm;
pub mod merge;
pub mod pipeline;
pub mod summarize;

// Re-export commonly used types
pub use changelog::{ChangelogDocument, OutputFormat, RenderOptions};
pub use classify::{ChangeCategory, ClassificationResult};
pub use error::{ChangelogError, GitError, ProviderError};
pub use ingest::{CommitAnalysis, FileChange, FileStatus};
pub use llm::{ChatCompletionProvider, ProviderKind};
pub use summarize::{AiSummary, Impact, Metrics, SummarizedCommit, Summarizer, SummarizerConfig};
