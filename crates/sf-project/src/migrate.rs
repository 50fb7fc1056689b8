//! Schema migration framework.
//!
//! Migrations work on the untyped payload so a step can reshape fields that
//! no longer exist in the typed model. Each registered step lifts a payload
//! from version `n` to `n + 1`; new steps are added to [`MIGRATIONS`].

use serde_json::{Value, json};
use sf_model::{Project, ValueMap, create_empty_project, schema::DEFAULT_PROJECT_VERSION};
use tracing::{info, warn};

use crate::envelope::{SCHEMA_VERSION, check_shape};
use crate::{ProjectError, ProjectResult};

type MigrationFn = fn(Value) -> ProjectResult<Value>;

/// `(from_version, step)` pairs, one per schema revision.
const MIGRATIONS: &[(u32, MigrationFn)] = &[(0, migrate_v0_to_v1)];

pub fn migrate_to_latest(mut payload: Value, from: u32) -> ProjectResult<Value> {
    let mut version = from;
    while version < SCHEMA_VERSION {
        let step = MIGRATIONS
            .iter()
            .find(|(v, _)| *v == version)
            .map(|(_, step)| *step)
            .ok_or_else(|| ProjectError::Migration {
                what: format!("No migration path from version {}", version),
            })?;
        payload = step(payload)?;
        version += 1;
    }
    Ok(payload)
}

/// Version 0 files had no real shape difference; anything that already
/// decodes as a current project passes through, anything else is replaced
/// by an empty project flagged `migrated`.
fn migrate_v0_to_v1(payload: Value) -> ProjectResult<Value> {
    let decodes = check_shape(&payload).is_ok()
        && serde_json::from_value::<Project>(payload.clone()).is_ok();
    if decodes {
        return Ok(payload);
    }

    warn!("discarding project payload that cannot be migrated");
    let mut metadata = ValueMap::new();
    metadata.insert("migrated".to_string(), json!(true));
    let fresh = create_empty_project(metadata, DEFAULT_PROJECT_VERSION);
    info!("substituted empty project for unmigratable payload");
    Ok(serde_json::to_value(fresh)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_model::create_default_project;

    #[test]
    fn latest_is_noop() {
        let payload = serde_json::to_value(create_default_project()).unwrap();
        let migrated = migrate_to_latest(payload.clone(), SCHEMA_VERSION).unwrap();
        assert_eq!(migrated, payload);
    }

    #[test]
    fn v0_shaped_payload_passes_through() {
        let mut metadata = ValueMap::new();
        metadata.insert("migratedFrom".to_string(), json!("0"));
        let legacy = create_empty_project(metadata, "0.0.9");
        let payload = serde_json::to_value(&legacy).unwrap();

        let migrated = migrate_to_latest(payload.clone(), 0).unwrap();
        assert_eq!(migrated, payload);
    }

    #[test]
    fn v0_garbage_becomes_flagged_empty_project() {
        let migrated = migrate_to_latest(json!({ "nodes": [1, 2, 3] }), 0).unwrap();
        let project: Project = serde_json::from_value(migrated).unwrap();
        assert!(project.diagram.is_empty());
        assert_eq!(project.metadata.get("migrated"), Some(&json!(true)));
        assert_eq!(project.version, DEFAULT_PROJECT_VERSION);
    }

    #[test]
    fn shape_ok_but_undecodable_is_replaced() {
        let payload = json!({
            "version": "0.1",
            "metadata": {},
            "diagram": { "components": [{ "id": 7 }], "connections": [] }
        });
        let migrated = migrate_to_latest(payload, 0).unwrap();
        assert_eq!(migrated["metadata"]["migrated"], json!(true));
    }
}
