//! Ollama LLM provider
//!
//! Connects to a local Ollama server for inference. No API key needed.

use super::provider::http_agent;
use super::{CompletionRequest, LlmError, LlmProvider, ProviderStatus, ResponseFormat};
use std::time::Duration;

/// Ollama provider for local LLM inference
pub struct OllamaProvider {
    /// Base URL for the Ollama API
    base_url: String,

    /// Current model
    model: String,

    agent: ureq::Agent,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            agent: http_agent(timeout),
        }
    }
}

impl LlmProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn status(&self) -> ProviderStatus {
        // Reachability is only known on request; a configured URL counts as ready
        if self.base_url.is_empty() {
            ProviderStatus::Unavailable("No base URL configured".to_string())
        } else {
            ProviderStatus::Ready
        }
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let body = build_request_body(&self.model, request);

        let response = self
            .agent
            .post(&format!("{}/api/chat", self.base_url))
            .set("Content-Type", "application/json")
            .send_json(&body)?;

        let json: serde_json::Value = response.into_json()?;

        json.get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::Internal("Invalid Ollama response".to_string()))
    }
}

fn build_request_body(model: &str, request: &CompletionRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": m.role_str(),
                "content": m.content
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
        "stream": false,
        "options": { "temperature": request.temperature }
    });

    if request.format == ResponseFormat::Json {
        body["format"] = serde_json::Value::String("json".to_string());
    }

    body
}
