//! Clarifying-question step

use super::parse::{parse_json_object, string_list};
use super::prompts::{load_system_prompt, QUESTION_PROMPT_NAME, QUESTION_SYSTEM_PROMPT};
use super::QuestionStep;
use crate::error::Result;
use crate::llm::{LlmInvoker, ResponseFormat};
use crate::workflow::{ProjectIdea, Questions};
use std::path::Path;
use std::sync::Arc;

/// Generates clarifying questions through the LLM
pub struct LlmQuestionStep {
    invoker: Arc<dyn LlmInvoker>,
    system_prompt: String,
    max_questions: usize,
}

impl LlmQuestionStep {
    pub fn new(invoker: Arc<dyn LlmInvoker>, max_questions: usize) -> Self {
        Self {
            invoker,
            system_prompt: QUESTION_SYSTEM_PROMPT.to_string(),
            max_questions,
        }
    }

    pub fn with_prompts_dir(mut self, dir: Option<&Path>) -> Self {
        self.system_prompt = load_system_prompt(dir, QUESTION_PROMPT_NAME, QUESTION_SYSTEM_PROMPT);
        self
    }

    fn user_prompt(idea: &ProjectIdea) -> String {
        format!(
            "Project Idea: \"{}\"\n\n\
             Generate specific clarifying questions that will gather everything needed to \
             document this project.\n\n\
             Focus on understanding:\n\
             - Who will use this and how\n\
             - What specific features are needed\n\
             - Technical constraints and requirements\n\
             - Business goals and success criteria\n\
             - Implementation considerations",
            idea
        )
    }
}

impl QuestionStep for LlmQuestionStep {
    fn generate_questions(&self, idea: &ProjectIdea) -> Result<Questions> {
        let raw = self.invoker.invoke(
            &self.system_prompt,
            &Self::user_prompt(idea),
            ResponseFormat::Json,
        )?;

        let object = parse_json_object(&raw)?;
        let mut questions = Questions::new(string_list(&object, "questions", &raw)?)?;

        if questions.len() > self.max_questions {
            tracing::warn!(
                generated = questions.len(),
                max = self.max_questions,
                "Truncating question list"
            );
            questions.truncate(self.max_questions);
        }

        tracing::info!(count = questions.len(), "Generated questions");
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedInvoker;

    fn step(reply: &str, max: usize) -> (LlmQuestionStep, Arc<ScriptedInvoker>) {
        let invoker = ScriptedInvoker::new(vec![reply]);
        (LlmQuestionStep::new(invoker.clone(), max), invoker)
    }

    fn idea() -> ProjectIdea {
        ProjectIdea::new("A habit tracker").unwrap()
    }

    #[test]
    fn test_parses_fenced_questions() {
        let reply = "```json\n{\"questions\": [\"Who?\", \"Why?\"]}\n```";
        let (question_step, invoker) = step(reply, 10);
        let questions = question_step.generate_questions(&idea()).unwrap();
        assert_eq!(questions.as_slice(), &["Who?".to_string(), "Why?".to_string()]);

        let call = invoker.calls()[0].clone();
        assert_eq!(call.format, ResponseFormat::Json);
        assert!(call.user.starts_with("Project Idea: \"A habit tracker\""));
    }

    #[test]
    fn test_empty_list_is_generation_error() {
        let (empty_step, _) = step(r#"{"questions": []}"#, 10);
        assert_eq!(empty_step.generate_questions(&idea()).unwrap_err().kind(), "generation");
    }

    #[test]
    fn test_parse_and_schema_failures_are_distinguished() {
        let (parse_step, _) = step("not json at all", 10);
        assert_eq!(parse_step.generate_questions(&idea()).unwrap_err().kind(), "parse");

        let (schema_step, _) = step(r#"{"qs": ["a"]}"#, 10);
        let err = schema_step.generate_questions(&idea()).unwrap_err();
        assert_eq!(err.kind(), "schema");
        assert_eq!(err.raw_response(), Some(r#"{"qs": ["a"]}"#));
    }

    #[test]
    fn test_truncates_to_max() {
        let (capped_step, _) = step(r#"{"questions": ["a", "b", "c", "d"]}"#, 2);
        assert_eq!(capped_step.generate_questions(&idea()).unwrap().len(), 2);
    }
}
