//! The persisted envelope: `{ "schemaVersion": <n>, "project": { ... } }`.

use serde::Serialize;
use serde_json::{Map, Value};
use sf_model::Project;
use tracing::{debug, warn};

use crate::migrate::migrate_to_latest;
use crate::{ProjectError, ProjectResult};

/// Envelope format revision written by [`serialize_project`].
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    schema_version: u32,
    project: &'a Project,
}

/// Render `project` as a pretty-printed envelope at the current schema
/// version.
///
/// Fails with [`ProjectError::NonFinite`] if any coordinate or rotation is NaN
/// or infinite, since JSON would write it as `null` and the file could not be
/// read back.
pub fn serialize_project(project: &Project) -> ProjectResult<String> {
    ensure_finite_geometry(project)?;
    let text = serde_json::to_string_pretty(&Envelope {
        schema_version: SCHEMA_VERSION,
        project,
    })?;
    Ok(text)
}

/// Parse an envelope, migrating older schema versions.
pub fn deserialize_project(text: &str) -> ProjectResult<Project> {
    let value: Value = serde_json::from_str(text).map_err(|e| ProjectError::InvalidPayload {
        reason: e.to_string(),
    })?;
    let Value::Object(mut envelope) = value else {
        return Err(ProjectError::InvalidPayload {
            reason: "envelope is not an object".to_string(),
        });
    };

    let schema_version = envelope
        .get("schemaVersion")
        .and_then(Value::as_f64)
        .ok_or(ProjectError::MissingSchemaVersion)?;

    if schema_version > f64::from(SCHEMA_VERSION) {
        return Err(ProjectError::UnsupportedSchemaVersion {
            found: schema_version,
            supported: SCHEMA_VERSION,
        });
    }

    let payload = envelope.remove("project").unwrap_or(Value::Null);

    if schema_version < f64::from(SCHEMA_VERSION) {
        // Fractional or negative versions count as the revision below them.
        let from = schema_version.max(0.0).floor() as u32;
        debug!(from, to = SCHEMA_VERSION, "migrating project payload");
        let migrated = migrate_to_latest(payload, from)?;
        return decode(migrated);
    }

    check_shape(&payload).map_err(|reason| ProjectError::ProjectValidationFailed { reason })?;
    decode(payload)
}

fn ensure_finite_geometry(project: &Project) -> ProjectResult<()> {
    for component in &project.diagram.components {
        component.transform.ensure_finite().inspect_err(|err| {
            warn!(id = %component.id, %err, "refusing to serialize component");
        })?;
    }
    for connection in &project.diagram.connections {
        for point in &connection.routing_points {
            point.ensure_finite().inspect_err(|err| {
                warn!(id = %connection.id, %err, "refusing to serialize connection");
            })?;
        }
    }
    Ok(())
}

fn decode(payload: Value) -> ProjectResult<Project> {
    serde_json::from_value(payload).map_err(|e| ProjectError::ProjectValidationFailed {
        reason: e.to_string(),
    })
}

/// Coarse structural check on an untyped project payload.
pub(crate) fn check_shape(project: &Value) -> Result<(), String> {
    let project = project
        .as_object()
        .ok_or_else(|| "project is not an object".to_string())?;

    if !project.get("version").is_some_and(Value::is_string) {
        return Err("project.version must be a string".to_string());
    }
    if !project.get("metadata").is_some_and(Value::is_object) {
        return Err("project.metadata must be an object".to_string());
    }

    let diagram: &Map<String, Value> = project
        .get("diagram")
        .and_then(Value::as_object)
        .ok_or_else(|| "project.diagram must be an object".to_string())?;
    if !diagram.get("components").is_some_and(Value::is_array) {
        return Err("project.diagram.components must be an array".to_string());
    }
    if !diagram.get("connections").is_some_and(Value::is_array) {
        return Err("project.diagram.connections must be an array".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sf_model::{NewComponent, add_component, create_default_project};

    #[test]
    fn envelope_carries_schema_version() {
        let text = serialize_project(&create_default_project()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["schemaVersion"], json!(SCHEMA_VERSION));
        assert_eq!(value["project"]["version"], "1.0.0");
        assert_eq!(value["project"]["diagram"]["components"], json!([]));
    }

    #[test]
    fn serialized_text_is_pretty() {
        let project = add_component(&create_default_project(), NewComponent::new("c1", "Valve"))
            .unwrap();
        let text = serialize_project(&project).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("\"flipH\": false"));
    }

    #[test]
    fn refuses_non_finite_coordinates() {
        let mut project =
            add_component(&create_default_project(), NewComponent::new("c1", "Valve")).unwrap();
        project.diagram.components[0].transform.x = f64::NAN;
        assert!(matches!(
            serialize_project(&project),
            Err(ProjectError::NonFinite(_))
        ));
    }

    #[test]
    fn fractional_and_negative_versions_migrate_from_zero() {
        let project =
            add_component(&create_default_project(), NewComponent::new("c1", "Valve")).unwrap();
        for version in [json!(0.5), json!(-1)] {
            let text = json!({ "schemaVersion": version, "project": project }).to_string();
            assert_eq!(deserialize_project(&text).unwrap(), project, "{version}");
        }

        let text = json!({ "schemaVersion": 0.5, "project": [] }).to_string();
        let migrated = deserialize_project(&text).unwrap();
        assert_eq!(migrated.metadata.get("migrated"), Some(&json!(true)));
    }

    #[test]
    fn future_fractional_version_is_unsupported() {
        let text = json!({ "schemaVersion": 1.5, "project": {} }).to_string();
        assert!(matches!(
            deserialize_project(&text),
            Err(ProjectError::UnsupportedSchemaVersion { .. })
        ));
    }

    #[test]
    fn rejects_non_object_payloads() {
        for text in ["[]", "42", "\"text\"", "not json"] {
            let err = deserialize_project(text).unwrap_err();
            assert!(matches!(err, ProjectError::InvalidPayload { .. }), "{text}");
        }
    }

    #[test]
    fn rejects_non_numeric_schema_version() {
        let text = json!({ "schemaVersion": "1", "project": {} }).to_string();
        assert!(matches!(
            deserialize_project(&text),
            Err(ProjectError::MissingSchemaVersion)
        ));
    }

    #[test]
    fn rejects_future_schema_versions() {
        let text = json!({ "schemaVersion": SCHEMA_VERSION + 1, "project": {} }).to_string();
        assert!(matches!(
            deserialize_project(&text),
            Err(ProjectError::UnsupportedSchemaVersion { supported: SCHEMA_VERSION, .. })
        ));
    }

    #[test]
    fn current_version_requires_project_shape() {
        let cases = [
            json!(null),
            json!({ "metadata": {}, "diagram": { "components": [], "connections": [] } }),
            json!({ "version": "1", "metadata": [], "diagram": { "components": [], "connections": [] } }),
            json!({ "version": "1", "metadata": {}, "diagram": { "connections": [] } }),
            json!({ "version": "1", "metadata": {}, "diagram": { "components": [], "connections": {} } }),
        ];
        for project in cases {
            let text = json!({ "schemaVersion": SCHEMA_VERSION, "project": project }).to_string();
            assert!(matches!(
                deserialize_project(&text),
                Err(ProjectError::ProjectValidationFailed { .. })
            ));
        }
    }

    #[test]
    fn malformed_component_fails_validation() {
        let text = json!({
            "schemaVersion": SCHEMA_VERSION,
            "project": {
                "version": "1",
                "metadata": {},
                "diagram": { "components": [{ "id": "c1" }], "connections": [] }
            }
        })
        .to_string();
        assert!(matches!(
            deserialize_project(&text),
            Err(ProjectError::ProjectValidationFailed { .. })
        ));
    }
}
