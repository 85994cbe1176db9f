//! Run-scoped counters for provider usage and fallbacks.
//!
//! Observability only: nothing branches on these values except reporting.

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::llm::Usage;

/// Counters owned by the orchestrating caller and passed into summarization.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub api_calls: u64,
    pub total_tokens: u64,
    pub rule_based_fallbacks: u64,
    pub errors: u64,
    pub ai_unavailable: u64,
    pub commits_processed: u64,
    pub commits_skipped: u64,
    started: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            api_calls: 0,
            total_tokens: 0,
            rule_based_fallbacks: 0,
            errors: 0,
            ai_unavailable: 0,
            commits_processed: 0,
            commits_skipped: 0,
            started: Instant::now(),
        }
    }

    /// Start a new run. Never called implicitly.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn record_api_call(&mut self, usage: Option<Usage>) {
        self.api_calls += 1;
        if let Some(usage) = usage {
            self.total_tokens += usage.total();
        }
    }

    /// A failed AI attempt that was routed to the rule-based path.
    pub fn record_failure(&mut self) {
        self.errors += 1;
        self.rule_based_fallbacks += 1;
    }

    /// No AI attempt was made because no provider is available.
    pub fn record_unavailable(&mut self) {
        self.ai_unavailable += 1;
    }

    pub fn record_processed(&mut self) {
        self.commits_processed += 1;
    }

    pub fn record_skipped(&mut self) {
        self.commits_skipped += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            api_calls: self.api_calls,
            total_tokens: self.total_tokens,
            rule_based_fallbacks: self.rule_based_fallbacks,
            errors: self.errors,
            ai_unavailable: self.ai_unavailable,
            commits_processed: self.commits_processed,
            commits_skipped: self.commits_skipped,
            duration_ms: self.elapsed().as_millis() as u64,
        }
    }
}

/// Point-in-time snapshot of [`Metrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub api_calls: u64,
    pub total_tokens: u64,
    pub rule_based_fallbacks: u64,
    pub errors: u64,
    pub ai_unavailable: u64,
    pub commits_processed: u64,
    pub commits_skipped: u64,
    pub duration_ms: u64,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} commits processed, {} skipped; {} API calls, {} tokens; {} rule-based fallbacks, {} errors; {:.1}s",
            self.commits_processed,
            self.commits_skipped,
            self.api_calls,
            self.total_tokens,
            self.rule_based_fallbacks,
            self.errors,
            self.duration_ms as f64 / 1000.0
        )
    }
}
