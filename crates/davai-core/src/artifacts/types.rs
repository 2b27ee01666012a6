//! Persisted artifact records

use crate::workflow::DocumentSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Contents of `metadata.json`, written last into every artifact directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub project_idea: String,
    pub generated_at: DateTime<Utc>,
    pub total_documents: usize,
    /// Document names in generation order
    pub document_list: Vec<String>,
    pub output_path: PathBuf,
}

/// A listed artifact directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProject {
    #[serde(flatten)]
    pub metadata: ArtifactMetadata,
    pub folder_name: String,
    pub folder_path: PathBuf,
}

/// A saved project with its document contents
#[derive(Debug, Clone, Serialize)]
pub struct ProjectFiles {
    pub project: SavedProject,
    pub files: DocumentSet,
}
