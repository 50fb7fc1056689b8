//! sf-model: schematic document model, structural edits and validation.

pub mod catalog;
pub mod document;
pub mod schema;
pub mod validate;

pub use catalog::Catalog;
pub use document::{
    add_component, add_connection, check_add_component, check_add_connection,
    create_default_project, create_empty_project, move_component, remove_component,
    remove_connection,
};
pub use schema::*;
pub use validate::{UnconnectedPort, ValidationReport, unknown_types, validate_diagram, validate_project};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("{kind} with id \"{id}\" already exists")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("Unknown {side} component id \"{id}\"")]
    UnknownComponent { side: EndpointSide, id: String },

    #[error(transparent)]
    NonFinite(#[from] sf_core::CoreError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
