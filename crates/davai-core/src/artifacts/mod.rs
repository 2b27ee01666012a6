//! Generated documentation storage

mod store;
mod types;

pub use store::{folder_name, ArtifactStore};
pub use types::{ArtifactMetadata, ProjectFiles, SavedProject};
