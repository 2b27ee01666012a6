//! Configuration types for Davai
//!
//! Defines the structure of `.davai.toml` configuration.

use crate::workflow::ExecutionMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DavaiConfig {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Workflow behaviour
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Artifact storage
    #[serde(default)]
    pub storage: StorageConfig,
}

/// LLM configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Default provider to use (openai, claude, ollama)
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Provider configurations
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            temperature: default_temperature(),
            providers: default_providers(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the API
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default model for this provider
    #[serde(default)]
    pub default_model: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
            default_model: None,
        }
    }
}

/// Create default provider configurations
fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();

    // OpenAI - requires API key
    providers.insert(
        "openai".to_string(),
        ProviderConfig {
            enabled: false, // Disabled by default until API key is set
            api_key: None,
            base_url: Some("https://api.openai.com/v1".to_string()),
            default_model: Some("gpt-4o-mini".to_string()),
        },
    );

    // Claude - requires API key
    providers.insert(
        "claude".to_string(),
        ProviderConfig {
            enabled: false,
            api_key: None,
            base_url: Some("https://api.anthropic.com".to_string()),
            default_model: Some("claude-sonnet-4-20250514".to_string()),
        },
    );

    // Ollama - local, no API key needed
    providers.insert(
        "ollama".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: None,
            base_url: Some("http://localhost:11434".to_string()),
            default_model: Some("gemma3:4b".to_string()),
        },
    );

    providers
}

/// Workflow configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// How the seven document stages are executed
    #[serde(default)]
    pub mode: ExecutionMode,

    /// Upper bound on generated clarifying questions
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,

    /// Generate suggested answers as part of each run
    #[serde(default)]
    pub include_suggestions: bool,

    /// Directory holding `<category>_prompt.md` system prompt overrides
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,
}

fn default_max_questions() -> usize {
    10
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            max_questions: default_max_questions(),
            include_suggestions: false,
            prompts_dir: None,
        }
    }
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for generated artifact folders
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Characters of the sanitized idea kept in folder names
    #[serde(default = "default_idea_prefix_len")]
    pub idea_prefix_len: usize,

    /// Persist successful runs
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated_docs")
}

fn default_idea_prefix_len() -> usize {
    50
}

fn default_persist() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            idea_prefix_len: default_idea_prefix_len(),
            persist: default_persist(),
        }
    }
}

impl DavaiConfig {
    /// Get a provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(name)
    }

    /// Get the default provider config
    pub fn default_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider(&self.llm.default_provider)
    }

    /// Get all enabled providers, sorted by name
    pub fn enabled_providers(&self) -> Vec<(&String, &ProviderConfig)> {
        let mut enabled: Vec<_> = self
            .llm
            .providers
            .iter()
            .filter(|(_, config)| config.enabled)
            .collect();
        enabled.sort_by(|a, b| a.0.cmp(b.0));
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DavaiConfig = toml::from_str(
            r#"
            [workflow]
            mode = "parallel"

            [storage]
            output_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.workflow.mode, ExecutionMode::Parallel);
        assert_eq!(config.workflow.max_questions, 10);
        assert_eq!(config.storage.output_dir, PathBuf::from("out"));
        assert_eq!(config.storage.idea_prefix_len, 50);
        assert!(config.storage.persist);
        assert_eq!(config.llm.default_provider, "openai");
        assert!(config.llm.providers.contains_key("ollama"));
    }

    #[test]
    fn test_enabled_providers_sorted() {
        let mut config = DavaiConfig::default();
        config.llm.providers.get_mut("openai").unwrap().enabled = true;
        let names: Vec<_> = config
            .enabled_providers()
            .into_iter()
            .map(|(n, _)| n.clone())
            .collect();
        assert_eq!(names, vec!["ollama".to_string(), "openai".to_string()]);
    }
}
