//! Workflow data model
//!
//! Value types passed between the question step, the document chain and the
//! orchestrator. None of them are shared mutably; derived copies are created instead.

use super::DocumentSet;
use crate::config::DavaiConfig;
use crate::error::{DavaiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Free-text project description supplied by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectIdea(String);

impl ProjectIdea {
    /// Create an idea, rejecting blank input
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DavaiError::validation("Project idea must not be empty"));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ProjectIdea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, non-empty list of clarifying questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Questions(Vec<String>);

impl Questions {
    /// Wrap generated questions; an empty list means the step produced nothing usable
    pub fn new(questions: Vec<String>) -> Result<Self> {
        if questions.is_empty() {
            return Err(DavaiError::generation("No questions were generated"));
        }
        Ok(Self(questions))
    }

    /// Keep at most `max` questions (never below one)
    pub fn truncate(&mut self, max: usize) {
        self.0.truncate(max.max(1));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Idea plus the Q&A session, input to every document stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectData {
    project_idea: String,
    questions: Vec<String>,
    answers: Vec<String>,
}

impl ProjectData {
    /// Build project data; questions and answers must pair up one-to-one
    pub fn new(
        project_idea: impl Into<String>,
        questions: Vec<String>,
        answers: Vec<String>,
    ) -> Result<Self> {
        if questions.len() != answers.len() {
            return Err(DavaiError::validation(format!(
                "Number of answers ({}) must match number of questions ({})",
                answers.len(),
                questions.len()
            )));
        }

        Ok(Self {
            project_idea: project_idea.into(),
            questions,
            answers,
        })
    }

    pub fn project_idea(&self) -> &str {
        &self.project_idea
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// (question, answer) pairs in order
    pub fn qa_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .map(|(q, a)| (q.as_str(), a.as_str()))
    }

    /// Derived copy with a replaced idea text and the same Q&A
    pub fn with_idea(&self, project_idea: String) -> Self {
        Self {
            project_idea,
            questions: self.questions.clone(),
            answers: self.answers.clone(),
        }
    }
}

/// Suggested answers for a question list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub suggested_answers: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// How the seven document stages are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Each stage sees every document generated before it
    #[default]
    Chained,
    /// All stages run at once from the Q&A only
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Chained => "chained",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chained" | "chain" | "sequential" => Ok(ExecutionMode::Chained),
            "parallel" => Ok(ExecutionMode::Parallel),
            _ => Err(format!("Unknown execution mode: {}", s)),
        }
    }
}

/// Per-run overrides of the configured workflow behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: ExecutionMode,
    pub include_suggestions: bool,
    pub persist: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            include_suggestions: false,
            persist: true,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &DavaiConfig) -> Self {
        Self {
            mode: config.workflow.mode,
            include_suggestions: config.workflow.include_suggestions,
            persist: config.storage.persist,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_suggestions(mut self, include: bool) -> Self {
        self.include_suggestions = include;
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }
}

/// One entry of the execution trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub step_name: String,
    /// Summary of what went in (never document bodies)
    pub input_data: serde_json::Value,
    /// Summary of what came out (never document bodies)
    pub output_data: serde_json::Value,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl WorkflowStep {
    pub fn succeeded(
        step_name: impl Into<String>,
        input_data: serde_json::Value,
        output_data: serde_json::Value,
    ) -> Self {
        Self {
            step_name: step_name.into(),
            input_data,
            output_data,
            success: true,
            error_message: None,
        }
    }

    pub fn failed(
        step_name: impl Into<String>,
        input_data: serde_json::Value,
        error: &DavaiError,
    ) -> Self {
        Self {
            step_name: step_name.into(),
            input_data,
            output_data: serde_json::json!({ "error_kind": error.kind() }),
            success: false,
            error_message: Some(error.to_string()),
        }
    }
}

/// Terminal value of one workflow run
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub run_id: Uuid,
    pub project_idea: String,
    pub mode: ExecutionMode,
    pub steps: Vec<WorkflowStep>,
    /// Present iff `success`
    pub final_documentation: Option<DocumentSet>,
    pub success: bool,
    /// Seconds from entry to return
    pub total_duration: f64,
    /// Artifact directory, when the set was persisted
    pub output_path: Option<PathBuf>,
}

impl WorkflowResult {
    /// The failed trace entry, if the run failed
    pub fn failure(&self) -> Option<&WorkflowStep> {
        self.steps.iter().rev().find(|s| !s.success)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.failure().and_then(|s| s.error_message.as_deref())
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step_name.as_str()).collect()
    }
}
