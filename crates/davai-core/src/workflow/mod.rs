//! Documentation workflow
//!
//! Data model, context accumulation, the seven-stage document chain and the
//! orchestrator that ties question generation, the chain and storage together.

mod chain;
pub mod context;
mod documents;
mod orchestrator;
mod types;

pub use chain::{ChainFailure, ChainOutput, DocumentChain};
pub use context::{enhance, enhance_single, PriorDocuments};
pub use documents::{DocumentKind, DocumentSet};
pub use orchestrator::{OrchestratorBuilder, WorkflowOrchestrator};
pub use types::{
    ExecutionMode, ProjectData, ProjectIdea, Questions, RunOptions, Suggestions, WorkflowResult,
    WorkflowStep,
};
