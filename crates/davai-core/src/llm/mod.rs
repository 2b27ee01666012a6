//! LLM integration module
//!
//! Blocking, single-shot completions over multiple providers.
//!
//! Supported providers:
//! - OpenAI (and OpenAI-compatible endpoints via `base_url`)
//! - Claude (Anthropic API)
//! - Ollama (local inference)

mod claude;
mod client;
mod error;
mod message;
mod ollama;
mod openai;
mod provider;
mod registry;
mod retry;

pub use client::{LlmClient, LlmInvoker};
pub use error::LlmError;
pub use message::{ChatMessage, CompletionRequest, ResponseFormat, Role};
pub use provider::{LlmProvider, ProviderStatus, SharedProvider};
pub use registry::ProviderRegistry;
pub use retry::RetryPolicy;

// Provider implementations
pub use claude::ClaudeProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
