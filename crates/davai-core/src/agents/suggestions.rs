//! Suggested-answer step

use super::parse::{optional_string, parse_json_object, string_list};
use super::prompts::{load_system_prompt, SUGGESTION_PROMPT_NAME, SUGGESTION_SYSTEM_PROMPT};
use super::SuggestionStep;
use crate::error::{DavaiError, Result};
use crate::llm::{LlmInvoker, ResponseFormat};
use crate::workflow::{ProjectIdea, Questions, Suggestions};
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

/// Proposes answers to the clarifying questions
pub struct LlmSuggestionStep {
    invoker: Arc<dyn LlmInvoker>,
    system_prompt: String,
}

impl LlmSuggestionStep {
    pub fn new(invoker: Arc<dyn LlmInvoker>) -> Self {
        Self {
            invoker,
            system_prompt: SUGGESTION_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_prompts_dir(mut self, dir: Option<&Path>) -> Self {
        self.system_prompt =
            load_system_prompt(dir, SUGGESTION_PROMPT_NAME, SUGGESTION_SYSTEM_PROMPT);
        self
    }

    fn user_prompt(idea: &ProjectIdea, questions: &Questions) -> String {
        let mut prompt = format!("## Project Idea\n{}\n\n## Questions to Answer\n", idea);
        for (i, question) in questions.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {}", i + 1, question);
        }
        prompt.push_str(
            "\n## Request\n\
             Provide a specific, practical suggested answer to each question above, \
             in order, plus a short explanation of why they suit this project.",
        );
        prompt
    }
}

impl SuggestionStep for LlmSuggestionStep {
    fn suggest_answers(&self, idea: &ProjectIdea, questions: &Questions) -> Result<Suggestions> {
        let raw = self.invoker.invoke(
            &self.system_prompt,
            &Self::user_prompt(idea, questions),
            ResponseFormat::Json,
        )?;

        let object = parse_json_object(&raw)?;
        let suggested_answers = string_list(&object, "suggested_answers", &raw)?;
        let reasoning = optional_string(&object, "reasoning", &raw)?.unwrap_or_default();

        if suggested_answers.is_empty() {
            return Err(DavaiError::generation("No suggested answers were generated"));
        }
        if suggested_answers.len() != questions.len() {
            return Err(DavaiError::schema(
                format!(
                    "Expected {} suggested answers, got {}",
                    questions.len(),
                    suggested_answers.len()
                ),
                raw,
            ));
        }

        tracing::info!(count = suggested_answers.len(), "Generated suggested answers");
        Ok(Suggestions {
            suggested_answers,
            reasoning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedInvoker;

    fn questions() -> Questions {
        Questions::new(vec!["Who?".into(), "Why?".into()]).unwrap()
    }

    fn idea() -> ProjectIdea {
        ProjectIdea::new("A habit tracker").unwrap()
    }

    #[test]
    fn test_parses_suggestions() {
        let invoker = ScriptedInvoker::new(vec![
            r#"{"suggested_answers": ["Students", "Focus"], "reasoning": "Common use"}"#,
        ]);
        let step = LlmSuggestionStep::new(invoker.clone());

        let suggestions = step.suggest_answers(&idea(), &questions()).unwrap();
        assert_eq!(suggestions.suggested_answers, vec!["Students", "Focus"]);
        assert_eq!(suggestions.reasoning, "Common use");
        assert!(invoker.calls()[0].user.contains("2. Why?"));
    }

    #[test]
    fn test_count_mismatch_is_schema_error() {
        let invoker = ScriptedInvoker::new(vec![r#"{"suggested_answers": ["only one"]}"#]);
        let err = LlmSuggestionStep::new(invoker)
            .suggest_answers(&idea(), &questions())
            .unwrap_err();
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn test_blank_answer_is_reported_as_blank() {
        let invoker = ScriptedInvoker::new(vec![r#"{"suggested_answers": ["Students", ""]}"#]);
        let err = LlmSuggestionStep::new(invoker)
            .suggest_answers(&idea(), &questions())
            .unwrap_err();
        assert_eq!(err.kind(), "schema");
        assert!(err.to_string().contains("'suggested_answers' entry 2 is blank"));
    }

    #[test]
    fn test_missing_answers_is_schema_error() {
        let invoker = ScriptedInvoker::new(vec![r#"{"reasoning": "none"}"#]);
        let err = LlmSuggestionStep::new(invoker)
            .suggest_answers(&idea(), &questions())
            .unwrap_err();
        assert_eq!(err.kind(), "schema");
    }
}
