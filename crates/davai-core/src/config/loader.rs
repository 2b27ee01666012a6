//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.davai.toml` in the project root or the user config directory.

use super::types::{DavaiConfig, ProviderConfig};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.davai.toml`
/// 2. User-level `~/.config/davai/config.toml`
/// 3. Default configuration
pub fn load_config(project_dir: &Path) -> Result<DavaiConfig, ConfigError> {
    // Try project-level config first
    let project_config = project_dir.join(".davai.toml");
    if project_config.exists() {
        return load_from_file(&project_config);
    }

    // Try user-level config
    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            return load_from_file(&user_config);
        }
    }

    // Return default config with environment variable overrides
    apply_env_overrides(DavaiConfig::default())
}

/// Get user config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("davai").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_from_file(path: &Path) -> Result<DavaiConfig, ConfigError> {
    tracing::debug!(path = %path.display(), "Loading configuration");

    let content = std::fs::read_to_string(path)?;
    let mut config: DavaiConfig = toml::from_str(&content)?;

    // Expand environment variables in the config
    expand_env_vars(&mut config);

    apply_env_overrides(config)
}

fn env_regex() -> Regex {
    Regex::new(r"\$\{([^}]+)\}").expect("static env var pattern")
}

/// Expand ${VAR} patterns in string values
fn expand_env_vars(config: &mut DavaiConfig) {
    let env_regex = env_regex();

    for provider in config.llm.providers.values_mut() {
        if let Some(ref api_key) = provider.api_key {
            provider.api_key = Some(expand_string(api_key, &env_regex));
        }
        if let Some(ref base_url) = provider.base_url {
            provider.base_url = Some(expand_string(base_url, &env_regex));
        }
    }
}

/// Expand environment variables in a single string
fn expand_string(s: &str, regex: &Regex) -> String {
    regex
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

fn apply_env_overrides(config: DavaiConfig) -> Result<DavaiConfig, ConfigError> {
    apply_overrides_from(config, |key| {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    })
}

/// Apply environment variable overrides for common settings
///
/// Supports direct environment variables:
/// - OPENAI_API_KEY -> openai.api_key
/// - ANTHROPIC_API_KEY -> claude.api_key
/// - OLLAMA_BASE_URL -> ollama.base_url
/// - DAVAI_DEFAULT_PROVIDER -> llm.default_provider
/// - DAVAI_OUTPUT_DIR -> storage.output_dir
/// - DAVAI_EXECUTION_MODE -> workflow.mode
fn apply_overrides_from(
    mut config: DavaiConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DavaiConfig, ConfigError> {
    for (env_var, provider_id) in [("OPENAI_API_KEY", "openai"), ("ANTHROPIC_API_KEY", "claude")] {
        if let Some(key) = lookup(env_var) {
            let provider = config
                .llm
                .providers
                .entry(provider_id.to_string())
                .or_insert_with(ProviderConfig::default);
            provider.api_key = Some(key);
            provider.enabled = true;
        }
    }

    if let Some(url) = lookup("OLLAMA_BASE_URL") {
        let provider = config
            .llm
            .providers
            .entry("ollama".to_string())
            .or_insert_with(ProviderConfig::default);
        provider.base_url = Some(url);
    }

    if let Some(provider) = lookup("DAVAI_DEFAULT_PROVIDER") {
        config.llm.default_provider = provider;
    }

    if let Some(dir) = lookup("DAVAI_OUTPUT_DIR") {
        config.storage.output_dir = PathBuf::from(dir);
    }

    if let Some(mode) = lookup("DAVAI_EXECUTION_MODE") {
        config.workflow.mode = mode.parse().map_err(|_| ConfigError::InvalidValue {
            key: "DAVAI_EXECUTION_MODE".to_string(),
            value: mode.clone(),
        })?;
    }

    Ok(config)
}

/// Create a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Davai Configuration
# Place this file in your project root as .davai.toml
# or in ~/.config/davai/config.toml for global settings

[llm]
# Default provider: openai, claude, ollama
default_provider = "openai"

# Request timeout in seconds
timeout = 120

# Maximum retries for transient failures
max_retries = 3

temperature = 0.7

[llm.providers.openai]
enabled = true
api_key = "${OPENAI_API_KEY}"
default_model = "gpt-4o-mini"

[llm.providers.claude]
enabled = false
api_key = "${ANTHROPIC_API_KEY}"
default_model = "claude-sonnet-4-20250514"

[llm.providers.ollama]
enabled = true
base_url = "http://localhost:11434"
default_model = "gemma3:4b"

[workflow]
# chained: each document sees every earlier document
# parallel: all documents generated at once from the Q&A only
mode = "chained"
max_questions = 10
include_suggestions = false
# prompts_dir = "prompts"

[storage]
output_dir = "generated_docs"
idea_prefix_len = 50
persist = true
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::ExecutionMode;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = DavaiConfig::default();
        assert_eq!(config.llm.default_provider, "openai");
        assert!(config.llm.providers.contains_key("ollama"));
    }

    #[test]
    fn test_sample_config_parses() {
        let config: DavaiConfig = toml::from_str(sample_config()).unwrap();
        assert_eq!(config.workflow.mode, ExecutionMode::Chained);
        assert_eq!(config.llm.providers.len(), 3);
    }

    #[test]
    fn test_expand_env_var() {
        let regex = env_regex();
        std::env::set_var("DAVAI_TEST_EXPAND_VAR", "test_value");
        let result = expand_string("prefix_${DAVAI_TEST_EXPAND_VAR}_suffix", &regex);
        assert_eq!(result, "prefix_test_value_suffix");
        std::env::remove_var("DAVAI_TEST_EXPAND_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let regex = env_regex();
        let result = expand_string("${DAVAI_NONEXISTENT_VAR}", &regex);
        assert_eq!(result, "${DAVAI_NONEXISTENT_VAR}");
    }

    #[test]
    fn test_overrides_enable_keyed_providers() {
        let config = apply_overrides_from(
            DavaiConfig::default(),
            lookup_from(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("DAVAI_OUTPUT_DIR", "/tmp/docs"),
                ("DAVAI_EXECUTION_MODE", "parallel"),
            ]),
        )
        .unwrap();

        let openai = config.get_provider("openai").unwrap();
        assert!(openai.enabled);
        assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.storage.output_dir, PathBuf::from("/tmp/docs"));
        assert_eq!(config.workflow.mode, ExecutionMode::Parallel);
        assert!(!config.get_provider("claude").unwrap().enabled);
    }

    #[test]
    fn test_invalid_mode_override_is_rejected() {
        let err = apply_overrides_from(
            DavaiConfig::default(),
            lookup_from(&[("DAVAI_EXECUTION_MODE", "sideways")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".davai.toml");
        std::fs::write(
            &path,
            "[llm]\ndefault_provider = \"ollama\"\n\n[storage]\nidea_prefix_len = 20\n",
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.storage.idea_prefix_len, 20);
    }
}
