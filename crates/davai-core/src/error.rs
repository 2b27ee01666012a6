//! Error types for Davai Core
//!
//! Provides a unified error type for all workflow operations.

use crate::llm::LlmError;
use thiserror::Error;

/// Result type for Davai Core operations
pub type Result<T> = std::result::Result<T, DavaiError>;

/// Unified error type for Davai Core
#[derive(Error, Debug)]
pub enum DavaiError {
    /// Structural precondition violated (e.g. questions/answers length mismatch)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A step produced no usable output
    #[error("Generation error: {0}")]
    Generation(String),

    /// Step output was not valid JSON
    #[error("Parse error: {message}")]
    Parse { message: String, raw: String },

    /// Step output was JSON but did not match the expected shape
    #[error("Schema error: {message}")]
    Schema { message: String, raw: String },

    /// Two stages produced the same output filename
    #[error("Duplicate artifact '{filename}' produced by stage '{category}'")]
    DuplicateArtifact { filename: String, category: String },

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DavaiError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DavaiError::Validation(msg.into())
    }

    /// Create a generation error
    pub fn generation(msg: impl Into<String>) -> Self {
        DavaiError::Generation(msg.into())
    }

    /// Create a parse error carrying the raw response
    pub fn parse(msg: impl Into<String>, raw: impl Into<String>) -> Self {
        DavaiError::Parse {
            message: msg.into(),
            raw: raw.into(),
        }
    }

    /// Create a schema error carrying the raw response
    pub fn schema(msg: impl Into<String>, raw: impl Into<String>) -> Self {
        DavaiError::Schema {
            message: msg.into(),
            raw: raw.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        DavaiError::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        DavaiError::NotFound(msg.into())
    }

    /// Short machine-readable name of the error kind, used in traces
    pub fn kind(&self) -> &'static str {
        match self {
            DavaiError::Validation(_) => "validation",
            DavaiError::Generation(_) => "generation",
            DavaiError::Parse { .. } => "parse",
            DavaiError::Schema { .. } => "schema",
            DavaiError::DuplicateArtifact { .. } => "duplicate_artifact",
            DavaiError::NotFound(_) => "not_found",
            DavaiError::Io(_) => "io",
            DavaiError::Config(_) => "config",
            DavaiError::Llm(_) => "llm",
            DavaiError::Serialization(_) => "serialization",
        }
    }

    /// Raw model output attached to parse/schema failures
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            DavaiError::Parse { raw, .. } | DavaiError::Schema { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DavaiError {
    fn from(err: serde_json::Error) -> Self {
        DavaiError::Serialization(err.to_string())
    }
}

impl From<crate::config::ConfigError> for DavaiError {
    fn from(err: crate::config::ConfigError) -> Self {
        DavaiError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_schema_are_distinct() {
        let parse = DavaiError::parse("expected value", "not json");
        let schema = DavaiError::schema("missing 'questions'", "{}");

        assert_eq!(parse.kind(), "parse");
        assert_eq!(schema.kind(), "schema");
        assert_eq!(parse.raw_response(), Some("not json"));
        assert_eq!(schema.raw_response(), Some("{}"));
    }

    #[test]
    fn test_duplicate_artifact_message() {
        let err = DavaiError::DuplicateArtifact {
            filename: "README.md".into(),
            category: "readme".into(),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate artifact 'README.md' produced by stage 'readme'"
        );
    }

    #[test]
    fn test_llm_error_converts() {
        let err: DavaiError = LlmError::Timeout.into();
        assert_eq!(err.kind(), "llm");
        assert!(err.raw_response().is_none());
    }
}
