//! Model selection for one commit.

use tracing::debug;

use crate::ingest::CommitAnalysis;
use crate::llm::{ChatCompletionProvider, CommitComplexityInfo};

/// Environment variable naming a model that overrides tier selection.
pub const MODEL_ENV_VAR: &str = "CHANGESCRIBE_MODEL";

pub fn complexity_info(analysis: &CommitAnalysis) -> CommitComplexityInfo {
    CommitComplexityInfo {
        file_count: analysis.file_count(),
        line_count: analysis.diff_stats.total_changes(),
    }
}

/// An explicit override always wins, then `CHANGESCRIBE_MODEL`, then the tier.
pub fn resolve_model(
    provider: &dyn ChatCompletionProvider,
    model_override: Option<&str>,
    analysis: &CommitAnalysis,
) -> String {
    if let Some(model) = model_override.filter(|m| !m.trim().is_empty()) {
        return model.to_string();
    }
    if let Ok(model) = std::env::var(MODEL_ENV_VAR)
        && !model.trim().is_empty()
    {
        return model;
    }

    let tier = provider.select_optimal_model(&complexity_info(analysis));
    let model = provider.model_for_tier(tier);
    debug!(hash = %analysis.hash, tier = %tier, model = %model, "Selected model");
    model
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::ingest::{CommitMeta, DiffStats};
    use crate::llm::ModelTier;
    use crate::llm::provider::MockChatCompletionProvider;

    fn analysis(files: usize, lines: usize) -> CommitAnalysis {
        let meta = CommitMeta {
            hash: "abc1234".to_string(),
            subject: "feat: x".to_string(),
            ..Default::default()
        };
        let stats = DiffStats {
            files,
            insertions: lines,
            deletions: 0,
        };
        CommitAnalysis::assemble(meta, Vec::new(), Some(stats))
    }

    fn provider() -> MockChatCompletionProvider {
        let mut mock = MockChatCompletionProvider::new();
        mock.expect_select_optimal_model()
            .returning(|info| crate::llm::select_model_tier(info));
        mock.expect_model_for_tier().returning(|tier| match tier {
            ModelTier::Complex => "big".to_string(),
            _ => "small".to_string(),
        });
        mock
    }

    #[test]
    #[serial]
    fn test_tier_selects_model() {
        temp_env::with_var_unset(MODEL_ENV_VAR, || {
            let mock = provider();
            assert_eq!(resolve_model(&mock, None, &analysis(25, 10)), "big");
            assert_eq!(resolve_model(&mock, None, &analysis(1, 10)), "small");
        });
    }

    #[test]
    #[serial]
    fn test_explicit_override_wins() {
        temp_env::with_var(MODEL_ENV_VAR, Some("from-env"), || {
            let mock = MockChatCompletionProvider::new();
            assert_eq!(resolve_model(&mock, Some("pinned"), &analysis(25, 10)), "pinned");
        });
    }

    #[test]
    #[serial]
    fn test_env_override_beats_tier() {
        temp_env::with_var(MODEL_ENV_VAR, Some("from-env"), || {
            let mock = MockChatCompletionProvider::new();
            assert_eq!(resolve_model(&mock, None, &analysis(25, 10)), "from-env");
        });
    }
}
