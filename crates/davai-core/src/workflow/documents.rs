//! Document sets and the fixed set of document kinds

use crate::error::{DavaiError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Filename -> content mapping, kept in insertion (generation) order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    entries: Vec<(String, String)>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one document
    pub fn single(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            entries: vec![(filename.into(), content.into())],
        }
    }

    /// Insert a document; returns false and leaves the set unchanged if the filename exists
    pub fn insert(&mut self, filename: impl Into<String>, content: impl Into<String>) -> bool {
        let filename = filename.into();
        if self.contains(&filename) {
            return false;
        }
        self.entries.push((filename, content.into()));
        true
    }

    /// Merge `other` into this set.
    ///
    /// Fails without modifying `self` if any filename is already present.
    pub fn merge(&mut self, other: DocumentSet, category: &str) -> Result<()> {
        if let Some(filename) = other.filenames().find(|name| self.contains(name)) {
            return Err(DavaiError::DuplicateArtifact {
                filename: filename.to_string(),
                category: category.to_string(),
            });
        }
        self.entries.extend(other.entries);
        Ok(())
    }

    pub fn get(&self, filename: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, content)| content.as_str())
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == filename)
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for DocumentSet {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for DocumentSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, content) in &self.entries {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

/// The seven document stages, in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Context,
    Architecture,
    TechStack,
    TaskBreakdown,
    ProjectRules,
    ClaudeGuide,
    Readme,
}

impl DocumentKind {
    /// Every kind in generation order
    pub const ALL: [DocumentKind; 7] = [
        DocumentKind::Context,
        DocumentKind::Architecture,
        DocumentKind::TechStack,
        DocumentKind::TaskBreakdown,
        DocumentKind::ProjectRules,
        DocumentKind::ClaudeGuide,
        DocumentKind::Readme,
    ];

    /// Category under which this kind's documents are folded into later context
    pub fn category(&self) -> &'static str {
        match self {
            DocumentKind::Context => "context",
            DocumentKind::Architecture => "architecture",
            DocumentKind::TechStack => "tech_stack",
            DocumentKind::TaskBreakdown => "task_breakdown",
            DocumentKind::ProjectRules => "project_rules",
            DocumentKind::ClaudeGuide => "claude_guide",
            DocumentKind::Readme => "readme",
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            DocumentKind::Context => "context.md",
            DocumentKind::Architecture => "architecture.md",
            DocumentKind::TechStack => "tech-stack-selection.md",
            DocumentKind::TaskBreakdown => "TASK_BREAKDOWN.md",
            DocumentKind::ProjectRules => "project-rules.md",
            DocumentKind::ClaudeGuide => "CLAUDE.md",
            DocumentKind::Readme => "README.md",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Context => "Project Context",
            DocumentKind::Architecture => "Architecture",
            DocumentKind::TechStack => "Tech Stack",
            DocumentKind::TaskBreakdown => "Task Breakdown",
            DocumentKind::ProjectRules => "Project Rules",
            DocumentKind::ClaudeGuide => "Claude Guide",
            DocumentKind::Readme => "README",
        }
    }

    /// Trace step name for this stage
    pub fn step_name(&self) -> String {
        format!("generate_{}", self.category())
    }

    /// Position in the chain (0-based)
    pub fn index(&self) -> usize {
        match self {
            DocumentKind::Context => 0,
            DocumentKind::Architecture => 1,
            DocumentKind::TechStack => 2,
            DocumentKind::TaskBreakdown => 3,
            DocumentKind::ProjectRules => 4,
            DocumentKind::ClaudeGuide => 5,
            DocumentKind::Readme => 6,
        }
    }

    /// Every kind this one depends on: all earlier kinds in the chain
    pub fn dependencies(&self) -> &'static [DocumentKind] {
        let all: &'static [DocumentKind; 7] = &Self::ALL;
        &all[..self.index()]
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.category())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        DocumentKind::ALL
            .into_iter()
            .find(|kind| kind.category() == normalized)
            .ok_or_else(|| format!("Unknown document kind: {}", s))
    }
}
