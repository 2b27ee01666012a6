//! Built-in system prompts and per-kind user prompt focus
//!
//! Any system prompt can be replaced by dropping `<name>_prompt.md` into the
//! configured prompts directory.

use crate::workflow::DocumentKind;
use std::path::Path;

pub const QUESTION_PROMPT_NAME: &str = "question_generator";
pub const SUGGESTION_PROMPT_NAME: &str = "suggestion";

pub const QUESTION_SYSTEM_PROMPT: &str = r#"You are an expert project analyst who gathers the requirements needed to document a software project.

Generate 8-10 specific clarifying questions. The answers will be used to write:
1. Project context and value proposition
2. System architecture
3. Technology stack selection with rationale
4. Task breakdown and roadmap
5. Development rules and standards
6. An AI assistant integration guide (CLAUDE.md)
7. The main README

**Output Format:**
Respond with a strict JSON object (no markdown formatting):
{
  "questions": ["Question 1?", "Question 2?"]
}
"#;

pub const SUGGESTION_SYSTEM_PROMPT: &str = r#"You are an experienced project advisor. Given a project idea and a list of clarifying questions, propose the answers a thoughtful project owner would most likely give.

**Output Format:**
Respond with a strict JSON object (no markdown formatting):
{
  "suggested_answers": ["Answer to question 1", "Answer to question 2"],
  "reasoning": "Why these answers fit this project"
}

Provide exactly one answer per question, in the same order.
"#;

const DOCUMENT_PROMPT_FOOTER: &str = "Write in Markdown. Return only the document content, with no preamble and no surrounding code fence.";

/// Default system prompt for a document kind
pub fn document_system_prompt(kind: DocumentKind) -> String {
    let role = match kind {
        DocumentKind::Context => {
            "You are a senior business analyst. You write context.md: the document that explains what a project is, who it serves and why it matters."
        }
        DocumentKind::Architecture => {
            "You are a software architect. You write architecture.md: components, data flow, interfaces and deployment for a project, consistent with its context document."
        }
        DocumentKind::TechStack => {
            "You are a principal engineer. You write tech-stack-selection.md: concrete technology choices with rationale and trade-offs, consistent with the architecture."
        }
        DocumentKind::TaskBreakdown => {
            "You are a technical project manager. You write TASK_BREAKDOWN.md: phases, milestones and actionable tasks derived from the architecture and chosen stack."
        }
        DocumentKind::ProjectRules => {
            "You are an engineering lead. You write project-rules.md: coding standards, workflow, testing and review rules for the chosen stack."
        }
        DocumentKind::ClaudeGuide => {
            "You are an expert in AI-assisted development. You write CLAUDE.md: the guide an AI coding assistant reads before working on this repository."
        }
        DocumentKind::Readme => {
            "You are a technical writer. You write README.md: the front page of the repository, summarising every other document."
        }
    };
    format!("{}\n\n{}", role, DOCUMENT_PROMPT_FOOTER)
}

/// What the document for `kind` must cover
pub fn document_focus(kind: DocumentKind) -> &'static [&'static str] {
    match kind {
        DocumentKind::Context => &[
            "What the project does and why it matters",
            "Who will use it and how",
            "The business and technical context",
            "Project scope and success criteria",
        ],
        DocumentKind::Architecture => &[
            "System components and their responsibilities",
            "Data flow and storage",
            "External integrations and interfaces",
            "Scalability, security and deployment considerations",
        ],
        DocumentKind::TechStack => &[
            "Languages, frameworks and libraries for each component",
            "Data stores and infrastructure",
            "Rationale and alternatives considered",
            "Risks and operational costs",
        ],
        DocumentKind::TaskBreakdown => &[
            "Phases and milestones",
            "Concrete tasks with dependencies and rough estimates",
            "Testing and release tasks",
            "The critical path",
        ],
        DocumentKind::ProjectRules => &[
            "Code style and project structure conventions",
            "Branching, review and commit rules",
            "Testing and quality gates",
            "Documentation and security rules",
        ],
        DocumentKind::ClaudeGuide => &[
            "Project overview and repository layout",
            "Build, test and run commands",
            "Conventions the assistant must follow",
            "Areas that need extra care",
        ],
        DocumentKind::Readme => &[
            "Short project description and key features",
            "Getting started and installation",
            "Usage examples",
            "Links to the other project documents",
        ],
    }
}

/// Load `<dir>/<name>_prompt.md` if configured and present, else the default
pub fn load_system_prompt(prompts_dir: Option<&Path>, name: &str, default: &str) -> String {
    let Some(dir) = prompts_dir else {
        return default.to_string();
    };

    let path = dir.join(format!("{}_prompt.md", name));
    match std::fs::read_to_string(&path) {
        Ok(content) if !content.trim().is_empty() => {
            tracing::debug!(path = %path.display(), "Using prompt override");
            content.trim().to_string()
        }
        Ok(_) => default.to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => default.to_string(),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read prompt override, using default"
            );
            default.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_prompt_and_focus() {
        for kind in DocumentKind::ALL {
            assert!(document_system_prompt(kind).contains(DOCUMENT_PROMPT_FOOTER));
            assert!(!document_focus(kind).is_empty());
        }
    }

    #[test]
    fn test_override_file_replaces_default() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("architecture_prompt.md"), "  Custom prompt\n").unwrap();

        let prompt = load_system_prompt(Some(dir.path()), "architecture", "default");
        assert_eq!(prompt, "Custom prompt");

        let fallback = load_system_prompt(Some(dir.path()), "readme", "default");
        assert_eq!(fallback, "default");
    }

    #[test]
    fn test_no_dir_uses_default() {
        assert_eq!(load_system_prompt(None, "context", "default"), "default");
    }
}
