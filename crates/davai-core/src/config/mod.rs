//! Configuration module for Davai
//!
//! Handles loading and parsing of `.davai.toml` configuration files
//! with support for environment variable expansion.

mod loader;
mod types;

pub use loader::{load_config, load_from_file, sample_config, user_config_path, ConfigError};
pub use types::{DavaiConfig, LlmConfig, ProviderConfig, StorageConfig, WorkflowConfig};
