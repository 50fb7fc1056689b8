//! Error types for the sf-app layer.

use std::path::PathBuf;

/// Application error wrapping the lower crates' errors for both the CLI and
/// embedding hosts.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] sf_core::CoreError),

    #[error(transparent)]
    Model(#[from] sf_model::ModelError),

    #[error(transparent)]
    Project(#[from] sf_project::ProjectError),

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Document has no name yet; save it under a name first")]
    Unnamed,
}

/// Result type for sf-app operations.
pub type AppResult<T> = Result<T, AppError>;
