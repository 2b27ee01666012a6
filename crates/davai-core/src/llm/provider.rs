//! LLM provider trait

use super::{CompletionRequest, LlmError};
use std::time::Duration;

/// Provider status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    /// Ready to accept requests
    Ready,

    /// Not available (no API key, server down, etc.)
    Unavailable(String),
}

impl ProviderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProviderStatus::Ready)
    }
}

/// LLM provider trait
///
/// Defines the interface for LLM providers (OpenAI, Claude, Ollama).
/// Calls are blocking; a single call is bounded by the provider's HTTP timeout.
pub trait LlmProvider: Send + Sync {
    /// Get the provider's unique identifier (e.g., "openai", "claude", "ollama")
    fn id(&self) -> &str;

    /// Model name sent with every request
    fn model(&self) -> &str;

    /// Get current provider status
    fn status(&self) -> ProviderStatus;

    /// Send the request and return the full response text
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Shared, thread-safe provider handle
pub type SharedProvider = std::sync::Arc<dyn LlmProvider>;

/// Build the blocking HTTP agent used by every provider
pub(crate) fn http_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout.min(Duration::from_secs(30)))
        .timeout(timeout)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_ready() {
        assert!(ProviderStatus::Ready.is_ready());
    }

    #[test]
    fn test_provider_status_unavailable() {
        let status = ProviderStatus::Unavailable("No API key".to_string());
        assert!(!status.is_ready());
        assert!(matches!(status, ProviderStatus::Unavailable(msg) if msg == "No API key"));
    }
}
