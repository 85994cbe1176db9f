//! Error types for changescribe modules using thiserror.

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git {command} exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// Broad classes of provider failure, used for user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connection,
    Configuration,
    RateLimit,
    Generic,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Connection => "connection",
            FailureKind::Configuration => "configuration",
            FailureKind::RateLimit => "rate limit",
            FailureKind::Generic => "generic",
        }
    }
}

/// Errors from AI chat-completion providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{0} CLI not found on PATH")]
    NotInstalled(&'static str),

    #[error("Failed to spawn provider process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Provider process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Provider CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Provider reported an error: {0}")]
    ExecutionFailed(String),

    #[error("Provider rate limited the request: {0}")]
    RateLimited(String),

    #[error("Provider returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<ProviderError>),
}

impl ProviderError {
    /// A non-zero CLI exit, promoted to `RateLimited` when stderr reports a limit.
    pub fn from_exit(code: i32, stderr: String) -> Self {
        match classify_message(&stderr) {
            FailureKind::RateLimit => ProviderError::RateLimited(stderr),
            _ => ProviderError::NonZeroExit { code, stderr },
        }
    }

    /// An error the CLI reported inside otherwise well-formed output.
    pub fn reported(message: String) -> Self {
        match classify_message(&message) {
            FailureKind::RateLimit => ProviderError::RateLimited(message),
            _ => ProviderError::ExecutionFailed(message),
        }
    }

    /// Classify the failure for messaging. Retry wrappers report their last error.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ProviderError::NotInstalled(_) | ProviderError::SpawnFailed(_) => {
                FailureKind::Configuration
            }
            ProviderError::Timeout(_) => FailureKind::Connection,
            ProviderError::RateLimited(_) => FailureKind::RateLimit,
            ProviderError::NonZeroExit { stderr, .. } => classify_message(stderr),
            ProviderError::ExecutionFailed(msg) => classify_message(msg),
            ProviderError::InvalidResponse(_) => FailureKind::Generic,
            ProviderError::RetriesExhausted(inner) => inner.failure_kind(),
        }
    }

    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.failure_kind(), FailureKind::Configuration)
    }
}

fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if lower.contains("rate limit") || lower.contains("429") || lower.contains("quota") {
        FailureKind::RateLimit
    } else if lower.contains("api key")
        || lower.contains("unauthorized")
        || lower.contains("401")
        || lower.contains("not logged in")
        || lower.contains("authentication")
    {
        FailureKind::Configuration
    } else if lower.contains("connection")
        || lower.contains("network")
        || lower.contains("timed out")
        || lower.contains("dns")
        || lower.contains("econnrefused")
    {
        FailureKind::Connection
    } else {
        FailureKind::Generic
    }
}

/// Errors from changelog output operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to persist changelog: {0}")]
    PersistFailed(#[source] tempfile::PersistError),

    #[error("Failed to serialize changelog: {0}")]
    SerializeFailed(#[source] serde_json::Error),
}
