//! Claude (Anthropic) LLM provider
//!
//! Connects to Anthropic's Messages API.

use super::provider::http_agent;
use super::{CompletionRequest, LlmError, LlmProvider, ProviderStatus};
use std::time::Duration;

/// Claude provider for Anthropic's API
pub struct ClaudeProvider {
    /// API key
    api_key: String,

    /// Base URL for the API
    base_url: String,

    /// Current model
    model: String,

    agent: ureq::Agent,
}

impl ClaudeProvider {
    /// Create a new Claude provider
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            model: model.to_string(),
            agent: http_agent(timeout),
        }
    }

    /// Create with a specific base URL (for proxies)
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

impl LlmProvider for ClaudeProvider {
    fn id(&self) -> &str {
        "claude"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn status(&self) -> ProviderStatus {
        if self.api_key.is_empty() {
            ProviderStatus::Unavailable("No API key configured".to_string())
        } else {
            ProviderStatus::Ready
        }
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::ProviderUnavailable("claude: no API key".to_string()));
        }

        let body = build_request_body(&self.model, request);

        let response = self
            .agent
            .post(&format!("{}/v1/messages", self.base_url))
            .set("Content-Type", "application/json")
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", "2023-06-01")
            .send_json(&body)?;

        let json: serde_json::Value = response.into_json()?;
        extract_text(&json)
    }
}

/// Build the Messages API body; system prompts go to the dedicated field
fn build_request_body(model: &str, request: &CompletionRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = request
        .conversation()
        .map(|msg| {
            serde_json::json!({
                "role": msg.role_str(),
                "content": msg.content
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": model,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": messages
    });

    if let Some(system) = request.system_text() {
        body["system"] = serde_json::Value::String(system);
    }

    body
}

fn extract_text(json: &serde_json::Value) -> Result<String, LlmError> {
    let text: Vec<&str> = json
        .get("content")
        .and_then(|c| c.as_array())
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::Internal("Invalid Anthropic response".to_string()));
    }
    Ok(text.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_moves_to_top_level() {
        let req = CompletionRequest::new(Some("You are terse."), "Describe it");
        let body = build_request_body("claude-sonnet-4-20250514", &req);

        assert_eq!(body["system"], "You are terse.");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_extract_joins_text_blocks() {
        let json = serde_json::json!({
            "content": [
                { "type": "text", "text": "part one " },
                { "type": "text", "text": "part two" }
            ]
        });
        assert_eq!(extract_text(&json).unwrap(), "part one part two");
    }

    #[test]
    fn test_extract_rejects_empty_content() {
        let json = serde_json::json!({ "content": [] });
        assert!(extract_text(&json).is_err());
    }
}
