//! The chat-completion capability consumed by the summarizer.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Per-request knobs. Adapters ignore what their CLI cannot express.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// JSON schema the response should follow, for CLIs that can enforce one.
    pub response_schema: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl Usage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

/// Size class of a commit, used to pick a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Simple,
    Standard,
    Medium,
    Complex,
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelTier::Simple => "simple",
            ModelTier::Standard => "standard",
            ModelTier::Medium => "medium",
            ModelTier::Complex => "complex",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitComplexityInfo {
    pub file_count: usize,
    pub line_count: usize,
}

/// Shared tier thresholds for every provider.
pub fn select_model_tier(info: &CommitComplexityInfo) -> ModelTier {
    if info.file_count > 20 || info.line_count > 1000 {
        ModelTier::Complex
    } else if info.file_count > 10 || info.line_count > 500 {
        ModelTier::Medium
    } else if info.line_count > 100 {
        ModelTier::Standard
    } else {
        ModelTier::Simple
    }
}

/// A vendor adapter capable of chat completions.
///
/// The summarizer never branches on vendor identity; it only uses this
/// contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCompletionProvider: Send + Sync {
    /// Short vendor name for logs and reports.
    fn name(&self) -> &'static str;

    /// Whether the provider is configured and reachable enough to attempt a call.
    fn is_available(&self) -> bool;

    fn select_optimal_model(&self, info: &CommitComplexityInfo) -> ModelTier {
        select_model_tier(info)
    }

    /// Vendor model name for a tier.
    fn model_for_tier(&self, tier: ModelTier) -> String;

    async fn generate_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, ProviderError>;
}

/// Flatten messages into one prompt for CLIs that take a single argument.
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        let tier = |file_count, line_count| {
            select_model_tier(&CommitComplexityInfo {
                file_count,
                line_count,
            })
        };
        assert_eq!(tier(1, 10), ModelTier::Simple);
        assert_eq!(tier(1, 100), ModelTier::Simple);
        assert_eq!(tier(1, 101), ModelTier::Standard);
        assert_eq!(tier(11, 0), ModelTier::Medium);
        assert_eq!(tier(2, 501), ModelTier::Medium);
        assert_eq!(tier(21, 0), ModelTier::Complex);
        assert_eq!(tier(1, 1001), ModelTier::Complex);
    }

    #[test]
    fn test_render_transcript_skips_empty() {
        let messages = vec![
            ChatMessage::system("You are a release engineer."),
            ChatMessage::user("   "),
            ChatMessage::user("Summarize this."),
        ];
        assert_eq!(
            render_transcript(&messages),
            "You are a release engineer.\n\nSummarize this."
        );
    }

    #[test]
    fn test_usage_total() {
        let usage = Usage {
            prompt_tokens: 120,
            completion_tokens: 30,
        };
        assert_eq!(usage.total(), 150);
    }
}
