use serde::{Deserialize, Serialize};
use weft_common::protocol::MESSAGE_CEILING;

/// Which generation path the coordinator runs. Which one is the default
/// is configuration, not behavior baked into the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    RuleBased,
    ModelAssisted,
    #[default]
    ModelWithFallback,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub reducer: ReducerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Analysis service URL. Without one the model path is unavailable
    /// and the coordinator runs rule-based generation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_timeout_ms(),
            max_messages: default_max_messages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReducerConfig {
    #[serde(default = "default_budget_bytes")]
    pub budget_bytes: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            budget_bytes: default_budget_bytes(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_messages() -> usize {
    MESSAGE_CEILING
}

fn default_budget_bytes() -> usize {
    crate::reducer::DEFAULT_BUDGET_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: CompilerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.strategy, Strategy::ModelWithFallback);
        assert_eq!(config.analyzer.timeout_ms, 30_000);
        assert!(config.analyzer.endpoint.is_none());
    }

    #[test]
    fn strategy_uses_snake_case_names() {
        let config: CompilerConfig = serde_yaml::from_str("strategy: rule_based").unwrap();
        assert_eq!(config.strategy, Strategy::RuleBased);
    }
}
