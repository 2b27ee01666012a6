//! Davai Core - documentation workflow library
//!
//! This crate provides the UI-agnostic backend:
//! - Workflow orchestration (questions, seven-stage document chain, trace)
//! - Context accumulation between document stages
//! - Artifact storage for generated documentation sets
//! - LLM providers (OpenAI, Claude, Ollama) with retry and fallback
//! - Configuration loading
//!
//! Any front end (CLI, web) drives the crate through [`WorkflowOrchestrator`].
//!
//! # Architecture
//!
//! ```text
//! idea ─→ QuestionStep ─→ (idea, questions, answers)
//!                                 │
//!               ┌─────────────────┴──────────────────┐
//!               │ DocumentChain                      │
//!               │ context → architecture → … → readme│
//!               └─────────────────┬──────────────────┘
//!                                 ↓
//!                           ArtifactStore
//! ```
//!
//! # Example
//!
//! ```ignore
//! use davai_core::{load_config, WorkflowOrchestrator};
//!
//! let config = load_config(&std::env::current_dir()?)?;
//! let orchestrator = WorkflowOrchestrator::from_config(&config)?;
//!
//! let questions = orchestrator.generate_questions("A habit tracker for students")?;
//! let answers = collect_answers(&questions);
//!
//! let result = orchestrator.run("A habit tracker for students", answers);
//! if !result.success {
//!     eprintln!("{:?}", result.error_message());
//! }
//! ```

pub mod agents;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod llm;
pub mod workflow;

pub use error::{DavaiError, Result};

// Re-export config types
pub use config::{load_config, load_from_file, sample_config, DavaiConfig};

// Re-export workflow types
pub use workflow::{
    ChainFailure, DocumentChain, DocumentKind, DocumentSet, ExecutionMode, PriorDocuments,
    ProjectData, ProjectIdea, Questions, RunOptions, Suggestions, WorkflowOrchestrator,
    WorkflowResult, WorkflowStep,
};

// Re-export step traits
pub use agents::{DocumentStep, QuestionStep, SuggestionStep};

// Re-export storage types
pub use artifacts::{ArtifactMetadata, ArtifactStore, ProjectFiles, SavedProject};

// Re-export LLM types
pub use llm::{LlmClient, LlmError, LlmInvoker, LlmProvider, ProviderRegistry, ResponseFormat};

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
