//! sf-project: versioned project file format, migration and storage.

pub mod autosave;
pub mod envelope;
pub mod migrate;
pub mod store;

pub use autosave::{recover_autosave, write_autosave};
pub use envelope::{SCHEMA_VERSION, deserialize_project, serialize_project};
pub use migrate::migrate_to_latest;
pub use store::{FileStore, MemoryStore, ProjectStore};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Missing schemaVersion")]
    MissingSchemaVersion,

    #[error("Unsupported schemaVersion {found} (latest supported is {supported})")]
    UnsupportedSchemaVersion { found: f64, supported: u32 },

    #[error("Project validation failed: {reason}")]
    ProjectValidationFailed { reason: String },

    #[error("Cannot save project: {0}")]
    NonFinite(#[from] sf_core::CoreError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Invalid project name: {name:?}")]
    InvalidName { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize `project` and store it under `name`.
pub fn save_project(
    store: &mut dyn ProjectStore,
    name: &str,
    project: &sf_model::Project,
) -> ProjectResult<()> {
    let text = serialize_project(project)?;
    store.save(name, &text)
}

/// Load and decode the project stored under `name`, if any.
pub fn load_project(
    store: &dyn ProjectStore,
    name: &str,
) -> ProjectResult<Option<sf_model::Project>> {
    match store.load(name)? {
        Some(text) => deserialize_project(&text).map(Some),
        None => Ok(None),
    }
}
