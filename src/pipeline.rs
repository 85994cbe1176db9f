//! End-to-end orchestration: ingest, classify, summarize, in discovery order.
//!
//! Commits are processed strictly one at a time. A commit that cannot be
//! resolved is counted as skipped and the batch continues.

use std::path::Path;

use tracing::{debug, warn};

use crate::git::VersionControlRunner;
use crate::ingest::{analyze_commit, analyze_working_tree};
use crate::summarize::{Metrics, SummarizedCommit, Summarizer};

/// Analyze and summarize `hashes` in order.
pub async fn summarize_commits<R: VersionControlRunner + ?Sized>(
    runner: &R,
    hashes: &[String],
    summarizer: &mut Summarizer<'_>,
    metrics: &mut Metrics,
) -> Vec<SummarizedCommit> {
    let mut out = Vec::with_capacity(hashes.len());
    for (index, hash) in hashes.iter().enumerate() {
        let Some(analysis) = analyze_commit(runner, hash).await else {
            warn!(hash = %hash, "Commit could not be analyzed, skipping");
            metrics.record_skipped();
            continue;
        };

        let summary = summarizer.summarize(&analysis, metrics).await;
        metrics.record_processed();
        debug!(
            hash = %analysis.short_hash(),
            position = index + 1,
            total = hashes.len(),
            category = %summary.category,
            impact = %summary.impact,
            "Summarized commit"
        );
        out.push(SummarizedCommit { analysis, summary });
    }
    out
}

/// Summarize uncommitted changes as a single pseudo-commit.
///
/// Returns an empty list when the working tree is clean.
pub async fn summarize_working_tree<R: VersionControlRunner + ?Sized>(
    runner: &R,
    root: &Path,
    summarizer: &mut Summarizer<'_>,
    metrics: &mut Metrics,
) -> Vec<SummarizedCommit> {
    let Some(analysis) = analyze_working_tree(runner, root).await else {
        debug!("No uncommitted changes");
        return Vec::new();
    };

    let summary = summarizer.summarize(&analysis, metrics).await;
    metrics.record_processed();
    vec![SummarizedCommit { analysis, summary }]
}
