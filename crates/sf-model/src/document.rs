//! Pure structural edits.
//!
//! Every function takes the current snapshot by reference and returns the
//! next one. Inputs are never mutated.

use sf_core::TransformPatch;
use tracing::debug;

use crate::schema::{
    Connection, Diagram, EndpointSide, EntityKind, NewComponent, Project, ValueMap,
};
use crate::{ModelError, ModelResult};

pub fn create_empty_project(metadata: ValueMap, version: impl Into<String>) -> Project {
    Project {
        metadata,
        version: version.into(),
        diagram: Diagram::default(),
    }
}

/// Empty project with no metadata and the default document version.
pub fn create_default_project() -> Project {
    Project::default()
}

/// Append a component. Unset transform fields come from the zero transform.
pub fn add_component(project: &Project, component: NewComponent) -> ModelResult<Project> {
    check_add_component(project, &component)?;

    debug!(id = %component.id, component_type = %component.component_type, "add component");

    let mut next = project.clone();
    next.diagram.components.push(component.into_instance());
    Ok(next)
}

/// The error [`add_component`] would return, without building the next
/// snapshot.
pub fn check_add_component(project: &Project, component: &NewComponent) -> ModelResult<()> {
    if project.diagram.component(&component.id).is_some() {
        return Err(ModelError::DuplicateId {
            kind: EntityKind::Component,
            id: component.id.clone(),
        });
    }
    component.transform.ensure_finite()?;
    Ok(())
}

/// Shallow-merge `patch` into the named component's transform.
///
/// An unknown id leaves the diagram unchanged.
pub fn move_component(project: &Project, component_id: &str, patch: &TransformPatch) -> Project {
    let mut next = project.clone();
    if let Some(component) = next
        .diagram
        .components
        .iter_mut()
        .find(|c| c.id == component_id)
    {
        component.transform = component.transform.merged(patch);
    }
    next
}

/// Remove a component and every connection that references it.
pub fn remove_component(project: &Project, component_id: &str) -> Project {
    let mut next = project.clone();
    next.diagram.components.retain(|c| c.id != component_id);

    let before = next.diagram.connections.len();
    next.diagram.connections.retain(|c| !c.touches(component_id));
    let dropped = before - next.diagram.connections.len();
    if dropped > 0 {
        debug!(id = component_id, dropped, "removed incident connections");
    }

    next
}

/// Append a connection. Both endpoint components must already exist; port
/// ids are left to validation.
pub fn add_connection(project: &Project, connection: Connection) -> ModelResult<Project> {
    check_add_connection(project, &connection)?;

    debug!(id = %connection.id, from = %connection.from.key(), to = %connection.to.key(), "add connection");

    let mut next = project.clone();
    next.diagram.connections.push(connection);
    Ok(next)
}

/// The error [`add_connection`] would return, without building the next
/// snapshot.
pub fn check_add_connection(project: &Project, connection: &Connection) -> ModelResult<()> {
    if project.diagram.connection(&connection.id).is_some() {
        return Err(ModelError::DuplicateId {
            kind: EntityKind::Connection,
            id: connection.id.clone(),
        });
    }

    for side in [EndpointSide::From, EndpointSide::To] {
        let endpoint = connection.endpoint(side);
        if project.diagram.component(&endpoint.component_id).is_none() {
            return Err(ModelError::UnknownComponent {
                side,
                id: endpoint.component_id.clone(),
            });
        }
    }

    for point in &connection.routing_points {
        point.ensure_finite()?;
    }
    Ok(())
}

/// Remove a single connection by id. An unknown id leaves the diagram
/// unchanged.
pub fn remove_connection(project: &Project, connection_id: &str) -> Project {
    let mut next = project.clone();
    next.diagram.connections.retain(|c| c.id != connection_id);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ComponentInstance, ConnectionEndpoint};
    use serde_json::json;
    use sf_core::Transform;

    fn wired_project() -> Project {
        let project = create_default_project();
        let project = add_component(&project, NewComponent::new("c1", "valve")).unwrap();
        let project =
            add_component(&project, NewComponent::new("c2", "valve").at(20.0, 40.0)).unwrap();
        add_connection(
            &project,
            Connection::new(
                "conn-1",
                ConnectionEndpoint::new("c1", "out"),
                ConnectionEndpoint::new("c2", "in"),
            ),
        )
        .unwrap()
    }

    #[test]
    fn create_empty_project_initializes_empty_diagram() {
        let mut metadata = ValueMap::new();
        metadata.insert("name".to_string(), json!("Demo"));
        let project = create_empty_project(metadata.clone(), "2.0.0");

        assert_eq!(project.metadata, metadata);
        assert_eq!(project.version, "2.0.0");
        assert!(project.diagram.components.is_empty());
        assert!(project.diagram.connections.is_empty());
    }

    #[test]
    fn default_project_uses_default_version() {
        let project = create_default_project();
        assert!(project.metadata.is_empty());
        assert_eq!(project.version, "1.0.0");
    }

    #[test]
    fn add_component_rejects_duplicate_id() {
        let project = wired_project();
        let err = add_component(&project, NewComponent::new("c1", "valve")).unwrap_err();
        assert!(matches!(
            err,
            ModelError::DuplicateId { kind: EntityKind::Component, ref id } if id == "c1"
        ));
    }

    #[test]
    fn add_component_rejects_non_finite_placement() {
        let project = create_default_project();
        let err = add_component(&project, NewComponent::new("c1", "valve").at(f64::NAN, 0.0))
            .unwrap_err();
        assert!(matches!(err, ModelError::NonFinite(_)));

        let mut tilted = NewComponent::new("c2", "valve");
        tilted.transform.rot = Some(f64::INFINITY);
        assert!(add_component(&project, tilted).is_err());
    }

    #[test]
    fn add_connection_rejects_non_finite_routing() {
        let project = wired_project();
        let mut connection = Connection::new(
            "conn-2",
            ConnectionEndpoint::new("c2", "out"),
            ConnectionEndpoint::new("c1", "in"),
        );
        connection.routing_points = vec![sf_core::Point::new(0.0, f64::NAN)];
        assert!(matches!(
            check_add_connection(&project, &connection),
            Err(ModelError::NonFinite(_))
        ));
    }

    #[test]
    fn add_component_leaves_input_untouched() {
        let project = create_default_project();
        let next = add_component(&project, NewComponent::new("c1", "valve")).unwrap();
        assert!(project.diagram.components.is_empty());
        assert_eq!(next.diagram.components.len(), 1);
    }

    #[test]
    fn move_component_merges_partial_transform() {
        let project = create_default_project();
        let project = add_component(
            &project,
            NewComponent::from(ComponentInstance::new("c1", "valve").with_transform(Transform {
                x: 1.0,
                y: 2.0,
                rot: 90.0,
                flip_h: true,
                flip_v: false,
            })),
        )
        .unwrap();

        let moved = move_component(&project, "c1", &TransformPatch::position(50.0, 60.0));
        let transform = moved.diagram.component("c1").unwrap().transform;
        assert_eq!(transform.x, 50.0);
        assert_eq!(transform.y, 60.0);
        assert_eq!(transform.rot, 90.0);
        assert!(transform.flip_h);
    }

    #[test]
    fn move_unknown_component_is_noop() {
        let project = wired_project();
        let moved = move_component(&project, "ghost", &TransformPatch::position(1.0, 1.0));
        assert_eq!(moved, project);
    }

    #[test]
    fn remove_component_cascades_connections() {
        let removed = remove_component(&wired_project(), "c1");
        let ids: Vec<_> = removed.diagram.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2"]);
        assert!(removed.diagram.connections.is_empty());
    }

    #[test]
    fn add_connection_rejects_unknown_components() {
        let project = wired_project();
        let err = add_connection(
            &project,
            Connection::new(
                "conn-2",
                ConnectionEndpoint::new("c1", "out"),
                ConnectionEndpoint::new("nope", "in"),
            ),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::UnknownComponent { side: EndpointSide::To, ref id } if id == "nope"
        ));
        assert_eq!(err.to_string(), "Unknown target component id \"nope\"");
    }

    #[test]
    fn add_connection_rejects_duplicate_id() {
        let project = wired_project();
        let err = add_connection(
            &project,
            Connection::new(
                "conn-1",
                ConnectionEndpoint::new("c2", "out"),
                ConnectionEndpoint::new("c1", "in"),
            ),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::DuplicateId { kind: EntityKind::Connection, .. }
        ));
    }

    #[test]
    fn add_connection_does_not_check_ports() {
        let project = wired_project();
        let next = add_connection(
            &project,
            Connection::new(
                "conn-2",
                ConnectionEndpoint::new("c2", "bogus"),
                ConnectionEndpoint::new("c1", "bogus"),
            ),
        )
        .unwrap();
        assert_eq!(next.diagram.connections.len(), 2);
    }

    #[test]
    fn remove_connection_by_id() {
        let project = wired_project();
        let next = remove_connection(&project, "conn-1");
        assert!(next.diagram.connections.is_empty());
        assert_eq!(next.diagram.components, project.diagram.components);
    }
}
