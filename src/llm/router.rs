//! Provider selection.

use std::fmt;

use super::claude::ClaudeProvider;
use super::codex::CodexProvider;
use super::provider::ChatCompletionProvider;

/// Supported chat-completion providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    #[default]
    Claude,
    Codex,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "Claude",
            ProviderKind::Codex => "Codex",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the adapter for `kind` with its default executor and retry policy.
pub fn create_provider(kind: ProviderKind) -> Box<dyn ChatCompletionProvider> {
    match kind {
        ProviderKind::Claude => Box::new(ClaudeProvider::new()),
        ProviderKind::Codex => Box::new(CodexProvider::new()),
    }
}
