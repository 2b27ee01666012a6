//! Blocking LLM client used by the workflow steps

use super::{CompletionRequest, LlmError, ProviderRegistry, ResponseFormat, RetryPolicy};
use crate::config::DavaiConfig;

/// Single-shot prompt invocation: a system prompt and a user prompt in, raw text out.
///
/// Implemented by [`LlmClient`]; steps depend on this trait so tests can script responses.
pub trait LlmInvoker: Send + Sync {
    fn invoke(&self, system: &str, user: &str, format: ResponseFormat) -> Result<String, LlmError>;
}

/// Routes requests through the provider registry with retries and provider fallback
pub struct LlmClient {
    registry: ProviderRegistry,
    retry: RetryPolicy,
    temperature: f32,
}

impl LlmClient {
    pub fn new(registry: ProviderRegistry, retry: RetryPolicy, temperature: f32) -> Self {
        Self {
            registry,
            retry,
            temperature,
        }
    }

    /// Build a client from configuration
    pub fn from_config(config: &DavaiConfig) -> Self {
        Self::new(
            ProviderRegistry::from_config(config),
            RetryPolicy::with_max_retries(config.llm.max_retries),
            config.llm.temperature,
        )
    }
}

impl LlmInvoker for LlmClient {
    fn invoke(&self, system: &str, user: &str, format: ResponseFormat) -> Result<String, LlmError> {
        let candidates = self.registry.candidates();
        if candidates.is_empty() {
            return Err(LlmError::ProviderUnavailable(format!(
                "No usable provider (active: '{}'); set an API key or enable ollama",
                self.registry.active_id()
            )));
        }

        let request = CompletionRequest::new(Some(system), user)
            .with_temperature(self.temperature)
            .with_format(format);

        let mut last_error = None;
        for provider in candidates {
            tracing::debug!(provider = provider.id(), model = provider.model(), "Invoking LLM");
            match self.retry.run(|_| provider.complete(&request)) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    tracing::warn!(provider = provider.id(), error = %err, "Provider failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Internal("no provider attempted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmProvider, ProviderStatus};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct ScriptedProvider {
        id: &'static str,
        replies: Mutex<Vec<Result<String, LlmError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(id: &'static str, replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                id,
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn id(&self) -> &str {
            self.id
        }
        fn model(&self) -> &str {
            "test-model"
        }
        fn status(&self) -> ProviderStatus {
            ProviderStatus::Ready
        }
        fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
            self.seen.lock().push(request.clone());
            self.replies.lock().remove(0)
        }
    }

    #[test]
    fn test_invoke_builds_request() {
        let provider = ScriptedProvider::new("fake", vec![Ok("{}".to_string())]);
        let mut registry = ProviderRegistry::new();
        registry.register(provider.clone());
        let client = LlmClient::new(registry, RetryPolicy::no_retry(), 0.2);

        let text = client.invoke("sys", "usr", ResponseFormat::Json).unwrap();
        assert_eq!(text, "{}");

        let seen = provider.seen.lock();
        assert_eq!(seen[0].system_text().as_deref(), Some("sys"));
        assert_eq!(seen[0].format, ResponseFormat::Json);
        assert_eq!(seen[0].temperature, 0.2);
    }

    #[test]
    fn test_falls_back_to_next_provider() {
        let first = ScriptedProvider::new(
            "a-first",
            vec![Err(LlmError::Api {
                status: 401,
                message: "bad key".into(),
            })],
        );
        let second = ScriptedProvider::new("b-second", vec![Ok("hello".to_string())]);
        let mut registry = ProviderRegistry::new();
        registry.register(first);
        registry.register(second);

        let client = LlmClient::new(registry, RetryPolicy::no_retry(), 0.7);
        assert_eq!(client.invoke("s", "u", ResponseFormat::Text).unwrap(), "hello");
    }

    #[test]
    fn test_no_provider_is_unavailable() {
        let client = LlmClient::new(ProviderRegistry::new(), RetryPolicy::no_retry(), 0.7);
        let err = client.invoke("s", "u", ResponseFormat::Text).unwrap_err();
        assert!(matches!(err, LlmError::ProviderUnavailable(_)));
    }
}
