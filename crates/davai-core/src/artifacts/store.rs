//! Artifact persistence
//!
//! One directory per successful run under a configured root:
//! `<root>/<idea_prefix>_<YYYYMMDD_HHMMSS>[_N]/` holding one Markdown file per
//! document and a `metadata.json` sidecar. The sidecar is written last, so a
//! directory without it is never listed.

use super::types::{ArtifactMetadata, ProjectFiles, SavedProject};
use crate::config::StorageConfig;
use crate::error::{DavaiError, Result};
use crate::workflow::DocumentSet;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const METADATA_FILE: &str = "metadata.json";

/// Upper bound on `_N` suffixes tried for one folder name
const MAX_SUFFIX: u32 = 1000;

/// Storage backend for generated documentation sets
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Root directory holding one folder per run
    root: PathBuf,

    /// Characters of the sanitized idea kept in folder names
    idea_prefix_len: usize,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            idea_prefix_len: 50,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            root: config.output_dir.clone(),
            idea_prefix_len: config.idea_prefix_len,
        }
    }

    pub fn with_prefix_len(mut self, len: usize) -> Self {
        self.idea_prefix_len = len;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a document set, returning the new artifact directory
    pub fn save(&self, documents: &DocumentSet, project_idea: &str) -> Result<PathBuf> {
        let files = planned_files(documents)?;

        fs::create_dir_all(&self.root).map_err(|e| {
            io_context(e, format!("Failed to create output directory {}", self.root.display()))
        })?;

        let generated_at = Utc::now();
        let base = folder_name(project_idea, self.idea_prefix_len, generated_at);
        let dir = self.claim_dir(&base)?;

        let metadata = ArtifactMetadata {
            project_idea: project_idea.to_string(),
            generated_at,
            total_documents: documents.len(),
            document_list: documents.filenames().map(String::from).collect(),
            output_path: dir.clone(),
        };

        if let Err(e) = write_contents(&dir, &files, &metadata) {
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                tracing::warn!(
                    path = %dir.display(),
                    error = %cleanup,
                    "Failed to remove partial artifact directory"
                );
            }
            return Err(e);
        }

        tracing::info!(path = %dir.display(), documents = documents.len(), "Saved documentation");
        Ok(dir)
    }

    /// All saved projects, newest first. Unreadable entries are skipped.
    pub fn list(&self) -> Result<Vec<SavedProject>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(io_context(
                    e,
                    format!("Failed to read output directory {}", self.root.display()),
                ))
            }
        };

        let mut projects = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let folder_name = entry.file_name().to_string_lossy().into_owned();

            match read_metadata(&path) {
                Ok(metadata) => projects.push(SavedProject {
                    metadata,
                    folder_name,
                    folder_path: path,
                }),
                Err(e) => {
                    tracing::warn!(folder = %folder_name, error = %e, "Skipping artifact folder");
                }
            }
        }

        projects.sort_by(|a, b| {
            b.metadata
                .generated_at
                .cmp(&a.metadata.generated_at)
                .then_with(|| b.folder_name.cmp(&a.folder_name))
        });
        Ok(projects)
    }

    /// A saved project and its documents.
    ///
    /// Documents come back in `document_list` order, followed by any other
    /// Markdown files in the folder in name order.
    pub fn get(&self, folder_name: &str) -> Result<ProjectFiles> {
        let project = self
            .list()?
            .into_iter()
            .find(|p| p.folder_name == folder_name)
            .ok_or_else(|| DavaiError::not_found(format!("Project '{}'", folder_name)))?;

        let dir = &project.folder_path;
        let mut files = DocumentSet::new();

        for name in &project.metadata.document_list {
            let path = dir.join(markdown_name(name));
            let content = fs::read_to_string(&path)
                .map_err(|e| io_context(e, format!("Failed to read {}", path.display())))?;
            files.insert(name.clone(), content);
        }

        let mut extra: Vec<String> = fs::read_dir(dir)
            .map_err(|e| io_context(e, format!("Failed to read {}", dir.display())))?
            .flatten()
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".md"))
            .filter(|name| {
                !project
                    .metadata
                    .document_list
                    .iter()
                    .any(|listed| markdown_name(listed) == *name)
            })
            .collect();
        extra.sort();

        for name in extra {
            let path = dir.join(&name);
            let content = fs::read_to_string(&path)
                .map_err(|e| io_context(e, format!("Failed to read {}", path.display())))?;
            files.insert(name, content);
        }

        Ok(ProjectFiles { project, files })
    }

    /// Create a fresh directory for `base`, adding `_2`, `_3`, ... if it is taken
    fn claim_dir(&self, base: &str) -> Result<PathBuf> {
        for n in 1..=MAX_SUFFIX {
            let name = if n == 1 {
                base.to_string()
            } else {
                format!("{}_{}", base, n)
            };
            let candidate = self.root.join(&name);

            match fs::create_dir(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(io_context(
                        e,
                        format!("Failed to create {}", candidate.display()),
                    ))
                }
            }
        }

        Err(DavaiError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("No free artifact folder name for '{}'", base),
        )))
    }
}

/// Folder name for an idea: sanitized, truncated, lowercased prefix plus a timestamp
pub fn folder_name(project_idea: &str, prefix_len: usize, at: DateTime<Utc>) -> String {
    let sanitized: String = project_idea
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(prefix_len)
        .collect();
    let mut prefix = sanitized.trim().replace(' ', "_").to_lowercase();
    if prefix.is_empty() {
        prefix = "project".to_string();
    }

    format!("{}_{}", prefix, at.format("%Y%m%d_%H%M%S"))
}

/// Append `.md` unless already present
fn markdown_name(name: &str) -> String {
    if name.ends_with(".md") {
        name.to_string()
    } else {
        format!("{}.md", name)
    }
}

/// Validate document names and map them to on-disk file names
fn planned_files(documents: &DocumentSet) -> Result<Vec<(String, &str)>> {
    let mut planned: Vec<(String, &str)> = Vec::with_capacity(documents.len());

    for (name, content) in documents.iter() {
        if name.trim().is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0')
            || name.contains("..")
        {
            return Err(DavaiError::validation(format!(
                "Invalid document filename '{}'",
                name
            )));
        }

        let file = markdown_name(name);
        if planned.iter().any(|(existing, _)| *existing == file) {
            return Err(DavaiError::validation(format!(
                "Documents '{}' map to the same file",
                name
            )));
        }
        planned.push((file, content));
    }

    Ok(planned)
}

fn write_contents(dir: &Path, files: &[(String, &str)], metadata: &ArtifactMetadata) -> Result<()> {
    for (file, content) in files {
        let path = dir.join(file);
        fs::write(&path, content)
            .map_err(|e| io_context(e, format!("Failed to write {}", path.display())))?;
    }

    let content = serde_json::to_string_pretty(metadata)?;

    // Write atomically using temp file
    let metadata_path = dir.join(METADATA_FILE);
    let temp_path = metadata_path.with_extension("json.tmp");
    fs::write(&temp_path, &content)
        .map_err(|e| io_context(e, "Failed to write metadata".to_string()))?;
    fs::rename(&temp_path, &metadata_path)
        .map_err(|e| io_context(e, "Failed to save metadata".to_string()))?;

    Ok(())
}

fn read_metadata(dir: &Path) -> Result<ArtifactMetadata> {
    let content = fs::read_to_string(dir.join(METADATA_FILE))
        .map_err(|e| io_context(e, "Failed to read metadata".to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| DavaiError::Serialization(format!("Failed to parse metadata: {}", e)))
}

fn io_context(e: std::io::Error, message: String) -> DavaiError {
    DavaiError::Io(std::io::Error::new(e.kind(), format!("{}: {}", message, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn documents() -> DocumentSet {
        let mut docs = DocumentSet::single("context.md", "# Context\n\nÜnïcode ✓\n");
        docs.insert("architecture.md", "# Architecture");
        docs
    }

    #[test]
    fn test_folder_name_sanitizes_and_truncates() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            folder_name("My Cool App! (v2) for *teams*", 50, at),
            "my_cool_app_v2_for_teams_20240309_140507"
        );
        assert_eq!(folder_name("Hello World", 7, at), "hello_w_20240309_140507");
        assert_eq!(folder_name("  Trailing  ", 12, at), "trailing_20240309_140507");
        assert_eq!(folder_name("!!!", 50, at), "project_20240309_140507");
    }

    #[test]
    fn test_save_writes_documents_and_metadata() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("docs"));

        let path = store.save(&documents(), "A recipe app").unwrap();
        assert!(path.starts_with(dir.path().join("docs")));
        assert_eq!(
            fs::read_to_string(path.join("context.md")).unwrap(),
            "# Context\n\nÜnïcode ✓\n"
        );

        let metadata = read_metadata(&path).unwrap();
        assert_eq!(metadata.total_documents, 2);
        assert_eq!(metadata.document_list, vec!["context.md", "architecture.md"]);
        assert_eq!(metadata.output_path, path);
        assert!(!path.join("metadata.json.tmp").exists());
    }

    #[test]
    fn test_extension_appended_when_missing() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.save(&DocumentSet::single("notes", "n"), "idea").unwrap();
        assert!(path.join("notes.md").exists());

        let folder = path.file_name().unwrap().to_string_lossy().into_owned();
        let loaded = store.get(&folder).unwrap();
        assert_eq!(loaded.files.get("notes"), Some("n"));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store
            .save(&DocumentSet::single("../escape.md", "x"), "idea")
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_rejects_nul_before_claiming_a_folder() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let mut docs = DocumentSet::single("a.md", "a");
        docs.insert("bad\0name", "b");

        assert_eq!(store.save(&docs, "idea").unwrap_err().kind(), "validation");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_removes_claimed_folder() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        // context.md is written, then the over-long name fails
        let mut docs = documents();
        docs.insert(format!("{}.md", "x".repeat(300)), "too long");

        assert_eq!(store.save(&docs, "Partial").unwrap_err().kind(), "io");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_same_second_saves_get_distinct_folders() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let first = store.save(&documents(), "Same idea").unwrap();
        let second = store.save(&documents(), "Same idea").unwrap();
        assert_ne!(first, second);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_list_skips_folders_without_valid_metadata() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&documents(), "Good").unwrap();

        fs::create_dir(dir.path().join("no_metadata")).unwrap();
        fs::create_dir(dir.path().join("bad_metadata")).unwrap();
        fs::write(dir.path().join("bad_metadata").join(METADATA_FILE), "{not json").unwrap();
        fs::write(dir.path().join("stray.txt"), "ignored").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].metadata.project_idea, "Good");
    }

    #[test]
    fn test_list_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("never_created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_get_orders_listed_then_extra_files() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.save(&documents(), "Order").unwrap();
        fs::write(path.join("zz-notes.md"), "z").unwrap();
        fs::write(path.join("aa-notes.md"), "a").unwrap();
        fs::write(path.join("ignored.txt"), "t").unwrap();

        let folder = path.file_name().unwrap().to_string_lossy().into_owned();
        let loaded = store.get(&folder).unwrap();
        assert_eq!(
            loaded.files.filenames().collect::<Vec<_>>(),
            vec!["context.md", "architecture.md", "aa-notes.md", "zz-notes.md"]
        );
    }

    #[test]
    fn test_get_unknown_folder_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert_eq!(store.get("missing_20240101_000000").unwrap_err().kind(), "not_found");
    }
}
