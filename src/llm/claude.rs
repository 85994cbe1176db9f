//! Claude Code CLI adapter.
//!
//! Runs `claude -p <prompt> --output-format json` and unwraps the CLI's JSON
//! envelope. Token usage is read from the envelope when present.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;

use super::provider::{
    ChatCompletionProvider, ChatMessage, Completion, CompletionOptions, ModelTier, Usage,
    render_transcript,
};
use super::retry::{RetryPolicy, retry_with_backoff};
use super::subprocess::{CliExecutor, SystemCli};

pub const PROGRAM: &str = "claude";

/// Environment variable overriding the subprocess timeout in seconds.
pub const TIMEOUT_ENV_VAR: &str = "CHANGESCRIBE_CLAUDE_TIMEOUT";

/// Claude CLI JSON envelope when using `--output-format json`.
#[derive(Deserialize)]
struct ClaudeCliResponse {
    result: String,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    usage: Option<ClaudeUsage>,
}

#[derive(Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

pub struct ClaudeProvider<E: CliExecutor = SystemCli> {
    executor: E,
    retry: RetryPolicy,
}

impl ClaudeProvider {
    pub fn new() -> Self {
        Self::with_executor(SystemCli::new(PROGRAM, TIMEOUT_ENV_VAR), RetryPolicy::default())
    }
}

impl Default for ClaudeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CliExecutor> ClaudeProvider<E> {
    pub fn with_executor(executor: E, retry: RetryPolicy) -> Self {
        Self { executor, retry }
    }

    async fn attempt(&self, args: &[String]) -> Result<Completion, ProviderError> {
        let stdout = self.executor.execute(args).await?;
        parse_envelope(&stdout)
    }
}

/// Unwrap the CLI envelope; plain stdout is accepted as the content.
fn parse_envelope(stdout: &str) -> Result<Completion, ProviderError> {
    let Ok(envelope) = serde_json::from_str::<ClaudeCliResponse>(stdout.trim()) else {
        if stdout.trim().is_empty() {
            return Err(ProviderError::InvalidResponse("empty output".to_string()));
        }
        return Ok(Completion {
            content: stdout.to_string(),
            usage: None,
        });
    };

    if envelope.is_error {
        return Err(ProviderError::reported(envelope.result));
    }

    Ok(Completion {
        content: envelope.result,
        usage: envelope.usage.map(|u| Usage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
        }),
    })
}

#[async_trait]
impl<E: CliExecutor> ChatCompletionProvider for ClaudeProvider<E> {
    fn name(&self) -> &'static str {
        PROGRAM
    }

    fn is_available(&self) -> bool {
        self.executor.is_installed()
    }

    fn model_for_tier(&self, tier: ModelTier) -> String {
        match tier {
            ModelTier::Simple => "haiku",
            ModelTier::Standard | ModelTier::Medium => "sonnet",
            ModelTier::Complex => "opus",
        }
        .to_string()
    }

    async fn generate_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError> {
        let mut args = vec![
            "-p".to_string(),
            render_transcript(messages),
            "--output-format".to_string(),
            "json".to_string(),
        ];
        if let Some(model) = &options.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        debug!(model = ?options.model, "Calling Claude CLI");

        retry_with_backoff(
            &self.retry,
            || self.attempt(&args),
            ProviderError::is_retryable,
            |e| ProviderError::RetriesExhausted(Box::new(e)),
        )
        .await
    }
}
