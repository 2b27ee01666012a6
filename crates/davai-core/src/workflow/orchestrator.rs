//! Workflow orchestrator
//!
//! Runs question generation, the document chain and persistence, and turns
//! every outcome into a [`WorkflowResult`]. `run` never returns an error: the
//! result's `success` flag and step trace describe what happened.

use super::chain::DocumentChain;
use super::context::PriorDocuments;
use super::{
    DocumentKind, DocumentSet, ProjectData, ProjectIdea, Questions, RunOptions, Suggestions,
    WorkflowResult, WorkflowStep,
};
use crate::agents::{
    llm_document_steps, DocumentStep, LlmQuestionStep, LlmSuggestionStep, QuestionStep,
    SuggestionStep,
};
use crate::artifacts::{ArtifactStore, ProjectFiles, SavedProject};
use crate::config::DavaiConfig;
use crate::error::{DavaiError, Result};
use crate::llm::{LlmClient, LlmInvoker};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const STEP_QUESTIONS: &str = "generate_questions";
const STEP_SUGGESTIONS: &str = "generate_suggestions";
const STEP_SAVE: &str = "save_documentation";
const STEP_FAILURE: &str = "workflow_failure";

/// Top-level workflow controller. Construct once and share by reference.
pub struct WorkflowOrchestrator {
    questions: Arc<dyn QuestionStep>,
    suggestions: Option<Arc<dyn SuggestionStep>>,
    chain: DocumentChain,
    store: ArtifactStore,
    defaults: RunOptions,
}

/// Why a run stopped
struct RunFailure {
    /// Trace name of the stage that failed, when known
    stage: Option<String>,
    error: DavaiError,
    /// Files completed before the failure (never persisted)
    completed: Vec<String>,
}

impl RunFailure {
    fn at(stage: impl Into<String>, error: DavaiError) -> Self {
        Self {
            stage: Some(stage.into()),
            error,
            completed: Vec::new(),
        }
    }
}

impl WorkflowOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Wire LLM-backed steps, storage and defaults from configuration
    pub fn from_config(config: &DavaiConfig) -> Result<Self> {
        let invoker: Arc<dyn LlmInvoker> = Arc::new(LlmClient::from_config(config));
        Self::with_invoker(config, invoker)
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied LLM invoker
    pub fn with_invoker(config: &DavaiConfig, invoker: Arc<dyn LlmInvoker>) -> Result<Self> {
        let prompts_dir = config.workflow.prompts_dir.as_deref();

        Self::builder()
            .question_step(Arc::new(
                LlmQuestionStep::new(invoker.clone(), config.workflow.max_questions)
                    .with_prompts_dir(prompts_dir),
            ))
            .suggestion_step(Arc::new(
                LlmSuggestionStep::new(invoker.clone()).with_prompts_dir(prompts_dir),
            ))
            .document_steps(llm_document_steps(invoker, prompts_dir))
            .store(ArtifactStore::from_config(&config.storage))
            .defaults(RunOptions::from_config(config))
            .build()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn default_options(&self) -> RunOptions {
        self.defaults
    }

    /// Run the complete workflow with the configured defaults
    pub fn run(&self, project_idea: &str, answers: Vec<String>) -> WorkflowResult {
        self.run_with(project_idea, answers, self.defaults)
    }

    /// Run the complete workflow
    pub fn run_with(
        &self,
        project_idea: &str,
        answers: Vec<String>,
        options: RunOptions,
    ) -> WorkflowResult {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("workflow", %run_id, mode = %options.mode);
        let _guard = span.enter();

        let started = Instant::now();
        let mut steps = Vec::new();
        tracing::info!("Starting workflow");

        let outcome = self.execute(project_idea, answers, options, &mut steps);
        let total_duration = started.elapsed().as_secs_f64();

        match outcome {
            Ok((documents, output_path)) => {
                tracing::info!(
                    documents = documents.len(),
                    duration_secs = total_duration,
                    "Workflow completed"
                );
                WorkflowResult {
                    run_id,
                    project_idea: project_idea.to_string(),
                    mode: options.mode,
                    steps,
                    final_documentation: Some(documents),
                    success: true,
                    total_duration,
                    output_path,
                }
            }
            Err(failure) => {
                tracing::error!(
                    stage = failure.stage.as_deref().unwrap_or("unknown"),
                    error = %failure.error,
                    "Workflow failed"
                );
                steps.push(WorkflowStep::failed(
                    STEP_FAILURE,
                    json!({
                        "stage": failure.stage,
                        "completed_files": failure.completed,
                    }),
                    &failure.error,
                ));
                WorkflowResult {
                    run_id,
                    project_idea: project_idea.to_string(),
                    mode: options.mode,
                    steps,
                    final_documentation: None,
                    success: false,
                    total_duration,
                    output_path: None,
                }
            }
        }
    }

    fn execute(
        &self,
        project_idea: &str,
        answers: Vec<String>,
        options: RunOptions,
        steps: &mut Vec<WorkflowStep>,
    ) -> std::result::Result<(DocumentSet, Option<PathBuf>), RunFailure> {
        let idea = ProjectIdea::new(project_idea).map_err(|e| RunFailure::at(STEP_QUESTIONS, e))?;

        let questions = self
            .questions
            .generate_questions(&idea)
            .map_err(|e| RunFailure::at(STEP_QUESTIONS, e))?;
        steps.push(WorkflowStep::succeeded(
            STEP_QUESTIONS,
            json!({ "project_idea": idea.as_str() }),
            json!({ "question_count": questions.len() }),
        ));

        let mut answers = answers;
        if options.include_suggestions {
            let suggestions = self
                .suggest_answers(&idea, &questions)
                .map_err(|e| RunFailure::at(STEP_SUGGESTIONS, e))?;
            let used_as_answers = answers.is_empty();
            steps.push(WorkflowStep::succeeded(
                STEP_SUGGESTIONS,
                json!({ "question_count": questions.len() }),
                json!({
                    "suggestion_count": suggestions.suggested_answers.len(),
                    "used_as_answers": used_as_answers,
                }),
            ));
            if used_as_answers {
                answers = suggestions.suggested_answers;
            }
        }

        // Length mismatch is reported as a failed run, never raised
        let data = ProjectData::new(idea.as_str(), questions.into_vec(), answers)
            .map_err(|e| RunFailure::at("validate_answers", e))?;

        let output = self.chain.run(&data, options.mode).map_err(|failure| {
            steps.extend(failure.steps);
            RunFailure {
                stage: Some(failure.stage.step_name()),
                error: failure.error,
                completed: failure.partial.filenames().map(String::from).collect(),
            }
        })?;
        steps.extend(output.steps);
        let documents = output.documents;

        if !options.persist {
            return Ok((documents, None));
        }

        let path = self
            .store
            .save(&documents, idea.as_str())
            .map_err(|error| RunFailure {
                stage: Some(STEP_SAVE.to_string()),
                error,
                completed: documents.filenames().map(String::from).collect(),
            })?;
        steps.push(WorkflowStep::succeeded(
            STEP_SAVE,
            json!({ "document_count": documents.len() }),
            json!({ "output_path": path.display().to_string() }),
        ));

        Ok((documents, Some(path)))
    }

    /// Generate clarifying questions for an idea
    pub fn generate_questions(&self, project_idea: &str) -> Result<Questions> {
        let idea = ProjectIdea::new(project_idea)?;
        self.questions.generate_questions(&idea)
    }

    /// Suggest answers for a question list
    pub fn suggest_answers(
        &self,
        idea: &ProjectIdea,
        questions: &Questions,
    ) -> Result<Suggestions> {
        let step = self
            .suggestions
            .as_ref()
            .ok_or_else(|| DavaiError::config("No suggestion step configured"))?;
        step.suggest_answers(idea, questions)
    }

    /// Run the document chain only; nothing is persisted
    pub fn generate_documentation(
        &self,
        project_idea: &str,
        questions: Vec<String>,
        answers: Vec<String>,
        options: RunOptions,
    ) -> Result<DocumentSet> {
        let data = ProjectData::new(project_idea, questions, answers)?;
        self.chain
            .run(&data, options.mode)
            .map(|output| output.documents)
            .map_err(|failure| {
                tracing::warn!(stage = failure.stage.category(), "Documentation generation failed");
                failure.error
            })
    }

    /// Generate a single document kind against supplied prior documents
    pub fn generate_stage(
        &self,
        kind: DocumentKind,
        data: &ProjectData,
        prior: &PriorDocuments,
    ) -> Result<DocumentSet> {
        self.chain.generate_stage(kind, data, prior)
    }

    pub fn list_saved_projects(&self) -> Result<Vec<SavedProject>> {
        self.store.list()
    }

    pub fn get_saved_project(&self, folder_name: &str) -> Result<ProjectFiles> {
        self.store.get(folder_name)
    }
}

/// Assembles an orchestrator from injected steps
#[derive(Default)]
pub struct OrchestratorBuilder {
    questions: Option<Arc<dyn QuestionStep>>,
    suggestions: Option<Arc<dyn SuggestionStep>>,
    documents: Vec<Arc<dyn DocumentStep>>,
    store: Option<ArtifactStore>,
    defaults: RunOptions,
}

impl OrchestratorBuilder {
    pub fn question_step(mut self, step: Arc<dyn QuestionStep>) -> Self {
        self.questions = Some(step);
        self
    }

    pub fn suggestion_step(mut self, step: Arc<dyn SuggestionStep>) -> Self {
        self.suggestions = Some(step);
        self
    }

    pub fn document_step(mut self, step: Arc<dyn DocumentStep>) -> Self {
        self.documents.push(step);
        self
    }

    pub fn document_steps(mut self, steps: Vec<Arc<dyn DocumentStep>>) -> Self {
        self.documents.extend(steps);
        self
    }

    pub fn store(mut self, store: ArtifactStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn defaults(mut self, defaults: RunOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn build(self) -> Result<WorkflowOrchestrator> {
        let questions = self
            .questions
            .ok_or_else(|| DavaiError::validation("No question step configured"))?;

        Ok(WorkflowOrchestrator {
            questions,
            suggestions: self.suggestions,
            chain: DocumentChain::new(self.documents)?,
            store: self
                .store
                .unwrap_or_else(|| ArtifactStore::new("generated_docs")),
            defaults: self.defaults,
        })
    }
}
