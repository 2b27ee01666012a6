//! Workflow steps
//!
//! The orchestrator only sees the step traits below. The `Llm*` implementations
//! back them with an [`LlmInvoker`]; tests substitute scripted fakes.

mod documents;
mod parse;
mod prompts;
mod questions;
mod suggestions;

pub use documents::LlmDocumentStep;
pub use parse::{parse_json_object, strip_code_fences};
pub use prompts::{document_focus, document_system_prompt};
pub use questions::LlmQuestionStep;
pub use suggestions::LlmSuggestionStep;

use crate::error::Result;
use crate::llm::LlmInvoker;
use crate::workflow::{DocumentKind, DocumentSet, ProjectData, ProjectIdea, Questions, Suggestions};
use std::path::Path;
use std::sync::Arc;

/// Produces the clarifying questions for an idea
pub trait QuestionStep: Send + Sync {
    fn generate_questions(&self, idea: &ProjectIdea) -> Result<Questions>;
}

/// Proposes answers to clarifying questions
pub trait SuggestionStep: Send + Sync {
    fn suggest_answers(&self, idea: &ProjectIdea, questions: &Questions) -> Result<Suggestions>;
}

/// One stage of the document chain
pub trait DocumentStep: Send + Sync {
    /// Which stage this step implements
    fn kind(&self) -> DocumentKind;

    /// Generate this stage's documents from the (context-augmented) project data
    fn generate(&self, data: &ProjectData) -> Result<DocumentSet>;
}

/// LLM-backed steps for all seven document kinds
pub fn llm_document_steps(
    invoker: Arc<dyn LlmInvoker>,
    prompts_dir: Option<&Path>,
) -> Vec<Arc<dyn DocumentStep>> {
    DocumentKind::ALL
        .into_iter()
        .map(|kind| {
            Arc::new(LlmDocumentStep::new(kind, invoker.clone()).with_prompts_dir(prompts_dir))
                as Arc<dyn DocumentStep>
        })
        .collect()
}
