//! Codex CLI adapter.
//!
//! Runs `codex exec`, passing `--output-schema` when the request carries a
//! response schema. The CLI does not report token usage.

use std::io::Write;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ProviderError;

use super::provider::{
    ChatCompletionProvider, ChatMessage, Completion, CompletionOptions, ModelTier,
    render_transcript,
};
use super::retry::{RetryPolicy, retry_with_backoff};
use super::subprocess::{CliExecutor, SystemCli};

pub const PROGRAM: &str = "codex";

/// Environment variable overriding the subprocess timeout in seconds.
pub const TIMEOUT_ENV_VAR: &str = "CHANGESCRIBE_CODEX_TIMEOUT";

pub struct CodexProvider<E: CliExecutor = SystemCli> {
    executor: E,
    retry: RetryPolicy,
}

impl CodexProvider {
    pub fn new() -> Self {
        Self::with_executor(SystemCli::new(PROGRAM, TIMEOUT_ENV_VAR), RetryPolicy::default())
    }
}

impl Default for CodexProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CliExecutor> CodexProvider<E> {
    pub fn with_executor(executor: E, retry: RetryPolicy) -> Self {
        Self { executor, retry }
    }

    async fn attempt(&self, args: &[String]) -> Result<Completion, ProviderError> {
        let stdout = self.executor.execute(args).await?;
        if stdout.trim().is_empty() {
            return Err(ProviderError::InvalidResponse("empty output".to_string()));
        }
        Ok(Completion {
            content: stdout,
            usage: None,
        })
    }
}

fn write_schema(schema: &str) -> Result<NamedTempFile, ProviderError> {
    let mut file = NamedTempFile::new()
        .map_err(|e| ProviderError::ExecutionFailed(format!("Failed to create schema file: {}", e)))?;
    file.write_all(schema.as_bytes())
        .map_err(|e| ProviderError::ExecutionFailed(format!("Failed to write schema file: {}", e)))?;
    Ok(file)
}

#[async_trait]
impl<E: CliExecutor> ChatCompletionProvider for CodexProvider<E> {
    fn name(&self) -> &'static str {
        PROGRAM
    }

    fn is_available(&self) -> bool {
        self.executor.is_installed()
    }

    fn model_for_tier(&self, tier: ModelTier) -> String {
        match tier {
            ModelTier::Simple | ModelTier::Standard => "gpt-5-mini",
            ModelTier::Medium | ModelTier::Complex => "gpt-5",
        }
        .to_string()
    }

    async fn generate_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError> {
        // Kept alive until every attempt has finished.
        let schema_file = options.response_schema.map(write_schema).transpose()?;

        let mut args = vec!["exec".to_string()];
        if let Some(model) = &options.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if let Some(file) = &schema_file {
            args.push("--output-schema".to_string());
            args.push(file.path().display().to_string());
        }
        args.push(render_transcript(messages));
        debug!(model = ?options.model, schema = schema_file.is_some(), "Calling Codex CLI");

        retry_with_backoff(
            &self.retry,
            || self.attempt(&args),
            ProviderError::is_retryable,
            |e| ProviderError::RetriesExhausted(Box::new(e)),
        )
        .await
    }
}
