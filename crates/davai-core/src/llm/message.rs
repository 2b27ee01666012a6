//! Chat message and completion request types

use serde::{Deserialize, Serialize};

/// Role in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Chat message for LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: Role,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Get the role as a string (for API compatibility)
    pub fn role_str(&self) -> &str {
        self.role.as_str()
    }
}

/// Shape of the response a step expects back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free-form text (markdown documents)
    #[default]
    Text,
    /// A single JSON object
    Json,
}

/// A single non-streaming completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub format: ResponseFormat,
}

impl CompletionRequest {
    /// Build a request from an optional system prompt and a user prompt
    pub fn new(system: Option<&str>, user: &str) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system.filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(user));

        Self {
            messages,
            temperature: 0.7,
            max_tokens: 8192,
            format: ResponseFormat::Text,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    /// Concatenated system prompt (providers with a dedicated system field)
    pub fn system_text(&self) -> Option<String> {
        let system: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        if system.is_empty() {
            None
        } else {
            Some(system.join("\n"))
        }
    }

    /// Non-system messages in order
    pub fn conversation(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.role_str(), "user");
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_request_with_system_prompt() {
        let req = CompletionRequest::new(Some("be brief"), "hi");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.system_text().as_deref(), Some("be brief"));
        assert_eq!(req.conversation().count(), 1);
    }

    #[test]
    fn test_request_skips_empty_system_prompt() {
        let req = CompletionRequest::new(Some(""), "hi").with_format(ResponseFormat::Json);
        assert_eq!(req.messages.len(), 1);
        assert!(req.system_text().is_none());
        assert_eq!(req.format, ResponseFormat::Json);
    }
}
