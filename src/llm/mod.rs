//! Chat-completion providers and shared helpers for calling them.

pub mod claude;
pub mod codex;
pub mod json;
pub mod provider;
pub mod retry;
pub mod router;
pub mod subprocess;

pub use claude::ClaudeProvider;
pub use codex::CodexProvider;
pub use json::locate_json_object;
pub use provider::{
    ChatCompletionProvider, ChatMessage, ChatRole, CommitComplexityInfo, Completion,
    CompletionOptions, ModelTier, Usage, select_model_tier,
};
pub use retry::RetryPolicy;
pub use router::{ProviderKind, create_provider};
