//! Document-generation steps, one per document kind

use super::prompts::{document_focus, document_system_prompt, load_system_prompt};
use super::DocumentStep;
use crate::error::{DavaiError, Result};
use crate::llm::{LlmInvoker, ResponseFormat};
use crate::workflow::{DocumentKind, DocumentSet, ProjectData};
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

/// Generates the single Markdown file of one document kind
pub struct LlmDocumentStep {
    kind: DocumentKind,
    invoker: Arc<dyn LlmInvoker>,
    system_prompt: String,
}

impl LlmDocumentStep {
    pub fn new(kind: DocumentKind, invoker: Arc<dyn LlmInvoker>) -> Self {
        Self {
            kind,
            invoker,
            system_prompt: document_system_prompt(kind),
        }
    }

    pub fn with_prompts_dir(mut self, dir: Option<&Path>) -> Self {
        let default = document_system_prompt(self.kind);
        self.system_prompt = load_system_prompt(dir, self.kind.category(), &default);
        self
    }

    /// User prompt: the (possibly context-augmented) idea, the Q&A, then what to cover
    pub fn user_prompt(&self, data: &ProjectData) -> String {
        let mut prompt = format!(
            "Project Idea: \"{}\"\n\nClarifying Questions and Answers:\n",
            data.project_idea()
        );
        for (question, answer) in data.qa_pairs() {
            let _ = writeln!(prompt, "Q: {}\nA: {}\n", question, answer);
        }

        let _ = write!(
            prompt,
            "Based on this project information, generate the {} file.\n\nFocus on:\n",
            self.kind.filename()
        );
        for item in document_focus(self.kind) {
            let _ = writeln!(prompt, "- {}", item);
        }
        prompt
    }
}

impl DocumentStep for LlmDocumentStep {
    fn kind(&self) -> DocumentKind {
        self.kind
    }

    fn generate(&self, data: &ProjectData) -> Result<DocumentSet> {
        let raw = self.invoker.invoke(
            &self.system_prompt,
            &self.user_prompt(data),
            ResponseFormat::Text,
        )?;

        let content = raw.trim();
        if content.is_empty() {
            return Err(DavaiError::generation(format!(
                "Empty response for {}",
                self.kind.filename()
            )));
        }

        Ok(DocumentSet::single(self.kind.filename(), content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedInvoker;

    fn data() -> ProjectData {
        ProjectData::new("A habit tracker", vec!["Who?".into()], vec!["Students".into()]).unwrap()
    }

    #[test]
    fn test_returns_trimmed_document_under_kind_filename() {
        let invoker = ScriptedInvoker::new(vec!["\n# Tech Stack\n\nRust\n\n"]);
        let step = LlmDocumentStep::new(DocumentKind::TechStack, invoker.clone());

        let docs = step.generate(&data()).unwrap();
        assert_eq!(docs.get("tech-stack-selection.md"), Some("# Tech Stack\n\nRust"));

        let call = invoker.calls()[0].clone();
        assert_eq!(call.format, ResponseFormat::Text);
        assert!(call.user.contains("Q: Who?\nA: Students"));
        assert!(call.user.contains("- Data stores and infrastructure"));
    }

    #[test]
    fn test_leading_and_trailing_code_blocks_are_kept() {
        let body = "```bash\nnpm install\n```\n\nUsage text\n\n```js\nrun()\n```";
        let invoker = ScriptedInvoker::new(vec![body]);
        let docs = LlmDocumentStep::new(DocumentKind::Readme, invoker)
            .generate(&data())
            .unwrap();
        assert_eq!(docs.get("README.md"), Some(body));
    }

    #[test]
    fn test_blank_response_is_generation_error() {
        let invoker = ScriptedInvoker::new(vec!["   \n"]);
        let err = LlmDocumentStep::new(DocumentKind::Context, invoker)
            .generate(&data())
            .unwrap_err();
        assert_eq!(err.kind(), "generation");
    }

    #[test]
    fn test_prompt_override_is_sent() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("context_prompt.md"), "Be brief.").unwrap();
        let invoker = ScriptedInvoker::new(vec!["# Context"]);

        LlmDocumentStep::new(DocumentKind::Context, invoker.clone())
            .with_prompts_dir(Some(dir.path()))
            .generate(&data())
            .unwrap();
        assert_eq!(invoker.calls()[0].system, "Be brief.");
    }
}
