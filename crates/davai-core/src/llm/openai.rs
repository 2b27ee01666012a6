//! OpenAI LLM provider
//!
//! Connects to OpenAI's (or an OpenAI-compatible) chat completions API.

use super::provider::http_agent;
use super::{CompletionRequest, LlmError, LlmProvider, ProviderStatus, ResponseFormat};
use std::time::Duration;

/// OpenAI provider
pub struct OpenAIProvider {
    /// API key
    api_key: String,

    /// Base URL for the API (supports OpenAI-compatible APIs)
    base_url: String,

    /// Current model
    model: String,

    /// HTTP agent (carries the request timeout)
    agent: ureq::Agent,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.to_string(),
            agent: http_agent(timeout),
        }
    }

    /// Create with a specific base URL (for OpenAI-compatible APIs like Azure, local proxies)
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

impl LlmProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
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
            return Err(LlmError::ProviderUnavailable("openai: no API key".to_string()));
        }

        let body = build_request_body(&self.model, request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)?;

        let json: serde_json::Value = response.into_json()?;
        extract_text(&json)
    }
}

/// Build the chat completions request body
fn build_request_body(model: &str, request: &CompletionRequest) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = request
        .messages
        .iter()
        .map(|msg| {
            serde_json::json!({
                "role": msg.role_str(),
                "content": msg.content
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
        "temperature": request.temperature
    });

    if request.format == ResponseFormat::Json {
        body["response_format"] = serde_json::json!({ "type": "json_object" });
    }

    body
}

/// Pull the assistant text out of a chat completions response
fn extract_text(json: &serde_json::Value) -> Result<String, LlmError> {
    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(LlmError::Api {
            status: 500,
            message: message.to_string(),
        });
    }

    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::Internal("Invalid OpenAI response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_requests_json_object_when_asked() {
        let req = CompletionRequest::new(Some("sys"), "user").with_format(ResponseFormat::Json);
        let body = build_request_body("gpt-4o-mini", &req);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_body_plain_text_has_no_response_format() {
        let req = CompletionRequest::new(None, "user");
        let body = build_request_body("gpt-4o", &req);
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_extract_text() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "# Title" } }]
        });
        assert_eq!(extract_text(&json).unwrap(), "# Title");
    }

    #[test]
    fn test_extract_error_body() {
        let json = serde_json::json!({ "error": { "message": "quota exceeded" } });
        let err = extract_text(&json).unwrap_err();
        assert!(matches!(err, LlmError::Api { message, .. } if message == "quota exceeded"));
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let provider = OpenAIProvider::new("", "gpt-4o", Duration::from_secs(5));
        assert!(!provider.status().is_ready());
        let err = provider.complete(&CompletionRequest::new(None, "hi")).unwrap_err();
        assert!(matches!(err, LlmError::ProviderUnavailable(_)));
    }
}
