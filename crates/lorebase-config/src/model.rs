//! Configuration schema for Lorebase.

use serde::{Deserialize, Serialize};

/// Root config for the conversational core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LorebaseConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl LorebaseConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> LorebaseConfigBuilder {
        LorebaseConfigBuilder::new()
    }
}

/// Builder for assembling a `LorebaseConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct LorebaseConfigBuilder {
    config: LorebaseConfig,
}

impl LorebaseConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: LorebaseConfig::default(),
        }
    }

    /// Replace the history persistence configuration.
    pub fn history(mut self, history: HistoryConfig) -> Self {
        self.config.history = history;
        self
    }

    /// Replace the agent loop configuration.
    pub fn agent(mut self, agent: AgentConfig) -> Self {
        self.config.agent = agent;
        self
    }

    /// Replace the retrieval configuration.
    pub fn retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.config.retrieval = retrieval;
        self
    }

    /// Finalize and return the built `LorebaseConfig`.
    pub fn build(self) -> LorebaseConfig {
        self.config
    }
}

/// Conversation history persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Whether mode logs are persisted at all.
    #[serde(default = "default_history_enabled")]
    pub enabled: bool,
    /// Maximum messages retained per mode.
    #[serde(default = "default_retention")]
    pub retention: usize,
    /// Storage root override; defaults under the user's home.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_history_enabled(),
            retention: default_retention(),
            path: None,
        }
    }
}

fn default_history_enabled() -> bool {
    true
}

fn default_retention() -> usize {
    100
}

/// Agentic tool-loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model round-trips in one tool-calling turn before aborting.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    /// Extra text appended to the agent system instruction.
    #[serde(default)]
    pub additional_instruction_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            additional_instruction_prompt: None,
        }
    }
}

fn default_max_tool_rounds() -> usize {
    8
}

/// Semantic retrieval grounding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum candidate notes cited in a grounding preamble.
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
    /// Maximum characters excerpted per source note.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_sources: default_max_sources(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

fn default_max_sources() -> usize {
    5
}

fn default_excerpt_chars() -> usize {
    600
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_documented_limits() {
        let config = LorebaseConfig::default();
        assert_eq!(config.history.enabled, true);
        assert_eq!(config.history.retention, 100);
        assert_eq!(config.agent.max_tool_rounds, 8);
        assert_eq!(config.retrieval.max_sources, 5);
    }

    #[test]
    fn builder_replaces_sections() {
        let config = LorebaseConfig::builder()
            .agent(AgentConfig {
                max_tool_rounds: 3,
                additional_instruction_prompt: None,
            })
            .history(HistoryConfig {
                enabled: false,
                retention: 10,
                path: None,
            })
            .build();
        assert_eq!(config.agent.max_tool_rounds, 3);
        assert_eq!(config.history.enabled, false);
        assert_eq!(config.history.retention, 10);
    }
}
