//! Provider registry for managing multiple LLM providers

use super::{ClaudeProvider, OllamaProvider, OpenAIProvider, SharedProvider};
use crate::config::{DavaiConfig, ProviderConfig};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for managing multiple LLM providers
pub struct ProviderRegistry {
    /// All registered providers
    providers: HashMap<String, SharedProvider>,

    /// Provider tried first, fixed at construction
    active_provider: String,

    /// Fallback chain for automatic failover
    fallback_chain: Vec<String>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            active_provider: String::new(),
            fallback_chain: Vec::new(),
        }
    }

    /// Create a registry from configuration, instantiating every usable enabled provider
    pub fn from_config(config: &DavaiConfig) -> Self {
        let mut registry = Self::new();
        let timeout = config.llm.timeout();

        for (id, provider_config) in config.enabled_providers() {
            match build_provider(id, provider_config, timeout) {
                Some(provider) => registry.register(provider),
                None => tracing::debug!(provider = %id, "Skipping provider without credentials"),
            }
        }

        // Set default provider
        registry.active_provider = config.llm.default_provider.clone();

        // Build fallback chain from enabled providers
        registry.fallback_chain = config
            .enabled_providers()
            .into_iter()
            .map(|(name, _)| name.clone())
            .filter(|name| *name != config.llm.default_provider)
            .collect();

        registry
    }

    /// Register a provider
    pub fn register(&mut self, provider: SharedProvider) {
        let id = provider.id().to_string();
        if self.active_provider.is_empty() {
            self.active_provider = id.clone();
        }
        self.providers.insert(id, provider);
    }

    /// Get a provider by ID
    pub fn get(&self, id: &str) -> Option<SharedProvider> {
        self.providers.get(id).cloned()
    }

    /// ID of the provider tried first
    pub fn active_id(&self) -> &str {
        &self.active_provider
    }

    /// Ready providers in the order they should be tried: active first, then the fallback chain
    pub fn candidates(&self) -> Vec<SharedProvider> {
        let active = self.active_provider.clone();
        let mut ids = vec![active.clone()];
        ids.extend(self.fallback_chain.iter().filter(|id| **id != active).cloned());

        let mut seen = Vec::new();
        let mut candidates = Vec::new();
        for id in ids {
            if seen.contains(&id) {
                continue;
            }
            if let Some(provider) = self.get(&id) {
                if provider.status().is_ready() {
                    candidates.push(provider);
                }
            }
            seen.push(id);
        }

        // Providers registered by hand that are in neither list
        let mut rest: Vec<_> = self
            .providers
            .iter()
            .filter(|(id, p)| !seen.contains(*id) && p.status().is_ready())
            .collect();
        rest.sort_by(|a, b| a.0.cmp(b.0));
        candidates.extend(rest.into_iter().map(|(_, p)| p.clone()));

        candidates
    }

    /// Get all registered provider IDs
    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether an API key is present and was actually expanded
fn usable_key(key: Option<&String>) -> Option<&str> {
    key.map(|k| k.trim())
        .filter(|k| !k.is_empty() && !k.starts_with("${"))
}

fn build_provider(
    id: &str,
    config: &ProviderConfig,
    timeout: std::time::Duration,
) -> Option<SharedProvider> {
    match id {
        "openai" => {
            let key = usable_key(config.api_key.as_ref())?;
            let model = config.default_model.as_deref().unwrap_or("gpt-4o-mini");
            let mut provider = OpenAIProvider::new(key, model, timeout);
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url);
            }
            Some(Arc::new(provider))
        }
        "claude" | "anthropic" => {
            let key = usable_key(config.api_key.as_ref())?;
            let model = config
                .default_model
                .as_deref()
                .unwrap_or("claude-sonnet-4-20250514");
            let mut provider = ClaudeProvider::new(key, model, timeout);
            if let Some(url) = &config.base_url {
                provider = provider.with_base_url(url);
            }
            Some(Arc::new(provider))
        }
        "ollama" => {
            let url = config.base_url.as_deref().unwrap_or("http://localhost:11434");
            let model = config.default_model.as_deref().unwrap_or("gemma3:4b");
            Some(Arc::new(OllamaProvider::new(url, model, timeout)))
        }
        other => {
            tracing::warn!(provider = %other, "Unknown provider in configuration, ignoring");
            None
        }
    }
}
