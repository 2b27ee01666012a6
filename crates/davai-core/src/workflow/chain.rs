//! Dependency chain runner
//!
//! Executes the seven document stages. In chained mode stage N receives every
//! document produced by stages 0..N; in parallel mode every stage sees only the
//! base Q&A. Failures abort the run and are handed back with the partial set.

use super::context::{enhance, PriorDocuments};
use super::{DocumentKind, DocumentSet, ExecutionMode, ProjectData, WorkflowStep};
use crate::agents::DocumentStep;
use crate::error::{DavaiError, Result};
use serde_json::json;
use std::sync::Arc;

/// Successful chain output
#[derive(Debug, Clone)]
pub struct ChainOutput {
    /// Cumulative document set in generation order
    pub documents: DocumentSet,
    /// One trace entry per stage
    pub steps: Vec<WorkflowStep>,
}

/// A stage failed; everything completed before it is carried for diagnostics
#[derive(Debug)]
pub struct ChainFailure {
    pub stage: DocumentKind,
    pub error: DavaiError,
    /// Documents from the stages that completed before the failure
    pub partial: DocumentSet,
    /// Trace entries of the completed stages
    pub steps: Vec<WorkflowStep>,
}

impl std::fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stage '{}' failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for ChainFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The fixed seven-stage document chain
pub struct DocumentChain {
    /// Indexed by `DocumentKind::index()`
    steps: Vec<Arc<dyn DocumentStep>>,
}

impl DocumentChain {
    /// Build a chain from one step per document kind, in any order
    pub fn new(steps: Vec<Arc<dyn DocumentStep>>) -> Result<Self> {
        let mut ordered = Vec::with_capacity(DocumentKind::ALL.len());
        for kind in DocumentKind::ALL {
            let mut matching = steps.iter().filter(|s| s.kind() == kind);
            let step = matching.next().ok_or_else(|| {
                DavaiError::validation(format!("No document step registered for '{}'", kind))
            })?;
            if matching.next().is_some() {
                return Err(DavaiError::validation(format!(
                    "More than one document step registered for '{}'",
                    kind
                )));
            }
            ordered.push(step.clone());
        }

        Ok(Self { steps: ordered })
    }

    pub fn step(&self, kind: DocumentKind) -> &dyn DocumentStep {
        self.steps[kind.index()].as_ref()
    }

    /// Run every stage in the given mode
    pub fn run(
        &self,
        base: &ProjectData,
        mode: ExecutionMode,
    ) -> std::result::Result<ChainOutput, ChainFailure> {
        match mode {
            ExecutionMode::Chained => self.run_chained(base),
            ExecutionMode::Parallel => self.run_parallel(base),
        }
    }

    /// Run one stage against caller-supplied prior documents
    pub fn generate_stage(
        &self,
        kind: DocumentKind,
        base: &ProjectData,
        prior: &PriorDocuments,
    ) -> Result<DocumentSet> {
        let input = enhance(base, prior);
        invoke(self.step(kind), &input)
    }

    fn run_chained(&self, base: &ProjectData) -> std::result::Result<ChainOutput, ChainFailure> {
        let mut prior = PriorDocuments::new();
        let mut documents = DocumentSet::new();
        let mut steps = Vec::with_capacity(self.steps.len());

        for kind in DocumentKind::ALL {
            tracing::info!(stage = kind.category(), "Generating document");

            // Fresh snapshot per stage; nothing later stages do can reach it
            let input = enhance(base, &prior);
            let result = invoke(self.step(kind), &input)
                .and_then(|produced| record(&mut documents, kind, produced));

            match result {
                Ok(produced) => {
                    steps.push(stage_step(kind, &prior.categories(), &produced));
                    prior.push(kind.category(), produced);
                }
                Err(error) => {
                    tracing::warn!(stage = kind.category(), error = %error, "Stage failed");
                    return Err(ChainFailure {
                        stage: kind,
                        error,
                        partial: documents,
                        steps,
                    });
                }
            }
        }

        Ok(ChainOutput { documents, steps })
    }

    fn run_parallel(&self, base: &ProjectData) -> std::result::Result<ChainOutput, ChainFailure> {
        tracing::info!(stages = self.steps.len(), "Generating documents in parallel");

        let results: Vec<Result<DocumentSet>> = std::thread::scope(|scope| {
            let handles: Vec<_> = DocumentKind::ALL
                .into_iter()
                .map(|kind| {
                    let step = self.step(kind);
                    scope.spawn(move || invoke(step, base))
                })
                .collect();

            handles
                .into_iter()
                .zip(DocumentKind::ALL)
                .map(|(handle, kind)| {
                    handle.join().unwrap_or_else(|_| {
                        Err(DavaiError::generation(format!(
                            "Stage '{}' panicked",
                            kind
                        )))
                    })
                })
                .collect()
        });

        let mut documents = DocumentSet::new();
        let mut steps = Vec::with_capacity(results.len());

        // Merge and trace in chain order; the first failure in that order is reported
        for (kind, result) in DocumentKind::ALL.into_iter().zip(results) {
            match result.and_then(|produced| record(&mut documents, kind, produced)) {
                Ok(produced) => steps.push(stage_step(kind, &[], &produced)),
                Err(error) => {
                    tracing::warn!(stage = kind.category(), error = %error, "Stage failed");
                    return Err(ChainFailure {
                        stage: kind,
                        error,
                        partial: documents,
                        steps,
                    });
                }
            }
        }

        Ok(ChainOutput { documents, steps })
    }
}

/// Call a step and reject empty output
fn invoke(step: &dyn DocumentStep, input: &ProjectData) -> Result<DocumentSet> {
    let produced = step.generate(input)?;
    if produced.is_empty() {
        return Err(DavaiError::generation(format!(
            "Stage '{}' produced no documents",
            step.kind()
        )));
    }
    Ok(produced)
}

/// Merge a stage's output into the cumulative set, returning the stage output for tracing
fn record(
    documents: &mut DocumentSet,
    kind: DocumentKind,
    produced: DocumentSet,
) -> Result<DocumentSet> {
    documents.merge(produced.clone(), kind.category())?;
    Ok(produced)
}

fn stage_step(kind: DocumentKind, dependencies: &[&str], produced: &DocumentSet) -> WorkflowStep {
    WorkflowStep::succeeded(
        kind.step_name(),
        json!({ "dependencies": dependencies }),
        json!({
            "files": produced.filenames().collect::<Vec<_>>(),
            "count": produced.len(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    /// Records the idea text it was given and returns its kind's file
    struct EchoStep {
        kind: DocumentKind,
        seen: Mutex<Vec<String>>,
    }

    impl DocumentStep for EchoStep {
        fn kind(&self) -> DocumentKind {
            self.kind
        }

        fn generate(&self, data: &ProjectData) -> Result<DocumentSet> {
            self.seen.lock().push(data.project_idea().to_string());
            Ok(DocumentSet::single(
                self.kind.filename(),
                format!("body of {}", self.kind),
            ))
        }
    }

    fn echo_steps() -> Vec<Arc<EchoStep>> {
        DocumentKind::ALL
            .into_iter()
            .map(|kind| {
                Arc::new(EchoStep {
                    kind,
                    seen: Mutex::new(Vec::new()),
                })
            })
            .collect()
    }

    fn chain_of(steps: &[Arc<EchoStep>]) -> DocumentChain {
        DocumentChain::new(
            steps
                .iter()
                .map(|s| s.clone() as Arc<dyn DocumentStep>)
                .collect(),
        )
        .unwrap()
    }

    fn base() -> ProjectData {
        ProjectData::new("idea", vec!["q".into()], vec!["a".into()]).unwrap()
    }

    #[test]
    fn test_chained_threads_all_prior_documents() {
        let steps = echo_steps();
        let output = chain_of(&steps).run(&base(), ExecutionMode::Chained).unwrap();

        assert_eq!(output.documents.len(), 7);
        let readme_input = steps[6].seen.lock()[0].clone();
        for kind in &DocumentKind::ALL[..6] {
            assert!(readme_input.contains(&format!("body of {}", kind)));
        }
        assert_eq!(steps[0].seen.lock()[0], "idea");

        let deps = &output.steps[3].input_data["dependencies"];
        assert_eq!(deps, &json!(["context", "architecture", "tech_stack"]));
    }

    #[test]
    fn test_parallel_stages_see_only_base() {
        let steps = echo_steps();
        let output = chain_of(&steps).run(&base(), ExecutionMode::Parallel).unwrap();

        assert_eq!(output.documents.len(), 7);
        for step in &steps {
            assert_eq!(step.seen.lock().as_slice(), &["idea".to_string()]);
        }
        let names: Vec<_> = output.steps.iter().map(|s| s.step_name.clone()).collect();
        let expected: Vec<_> = DocumentKind::ALL.iter().map(|k| k.step_name()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_missing_step_is_rejected() {
        let steps: Vec<Arc<dyn DocumentStep>> = echo_steps()
            .into_iter()
            .skip(1)
            .map(|s| s as Arc<dyn DocumentStep>)
            .collect();
        assert!(DocumentChain::new(steps).is_err());
    }

    #[test]
    fn test_generate_stage_uses_supplied_prior() {
        let steps = echo_steps();
        let chain = chain_of(&steps);
        let mut prior = PriorDocuments::new();
        prior.push("context", DocumentSet::single("context.md", "CTX"));

        let docs = chain
            .generate_stage(DocumentKind::Architecture, &base(), &prior)
            .unwrap();
        assert_eq!(docs.get("architecture.md"), Some("body of architecture"));
        assert!(steps[1].seen.lock()[0].contains("CTX"));
    }
}
