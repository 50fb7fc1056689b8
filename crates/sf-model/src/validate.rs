//! Structural diagnostics over a diagram.
//!
//! Diagnostics are data, not errors: a diagram with dangling references or
//! open ports is still a valid document to hold and edit.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::schema::{
    ComponentDefinition, ComponentInstance, Connection, Diagram, EndpointSide, Project,
};

/// A declared port that no connection endpoint refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnconnectedPort {
    pub component_id: String,
    pub port_id: String,
}

impl UnconnectedPort {
    pub fn new(component_id: impl Into<String>, port_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            port_id: port_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// `component:<id>` / `connection:<id>` for every repeated id.
    pub duplicate_ids: Vec<String>,
    /// `connection:<id>:<from|to>.<component|port>:<ref>`
    pub invalid_references: Vec<String>,
    pub unconnected_ports: Vec<UnconnectedPort>,
    pub is_valid: bool,
}

impl ValidationReport {
    pub fn issue_count(&self) -> usize {
        self.duplicate_ids.len() + self.invalid_references.len() + self.unconnected_ports.len()
    }
}

/// Check a diagram against a catalog of definitions.
///
/// Output order is fixed for a given input: connection-level findings follow
/// connection order, unconnected ports follow component order and then port
/// declaration order. Components whose type has no definition are skipped by
/// the port checks.
pub fn validate_diagram(diagram: &Diagram, definitions: &[ComponentDefinition]) -> ValidationReport {
    let mut duplicate_ids = Vec::new();
    let mut invalid_references = Vec::new();

    // First occurrence wins for lookups.
    let mut components_by_id: HashMap<&str, &ComponentInstance> = HashMap::new();
    for component in &diagram.components {
        if components_by_id.contains_key(component.id.as_str()) {
            duplicate_ids.push(format!("component:{}", component.id));
            continue;
        }
        components_by_id.insert(&component.id, component);
    }

    let mut connection_ids: HashSet<&str> = HashSet::new();
    for connection in &diagram.connections {
        if !connection_ids.insert(&connection.id) {
            duplicate_ids.push(format!("connection:{}", connection.id));
        }

        for side in [EndpointSide::From, EndpointSide::To] {
            let endpoint = connection.endpoint(side);
            if !components_by_id.contains_key(endpoint.component_id.as_str()) {
                invalid_references.push(reference_key(
                    connection,
                    side,
                    "component",
                    &endpoint.component_id,
                ));
            }
        }
    }

    let definitions_by_type: HashMap<&str, &ComponentDefinition> = definitions
        .iter()
        .map(|d| (d.component_type.as_str(), d))
        .collect();

    let mut used_ports: HashSet<String> = HashSet::new();
    for connection in &diagram.connections {
        for side in [EndpointSide::From, EndpointSide::To] {
            let endpoint = connection.endpoint(side);
            used_ports.insert(endpoint.key());

            let definition = components_by_id
                .get(endpoint.component_id.as_str())
                .and_then(|c| definitions_by_type.get(c.component_type.as_str()));
            if let Some(definition) = definition
                && !definition.has_port(&endpoint.port_id)
            {
                invalid_references.push(reference_key(connection, side, "port", &endpoint.port_id));
            }
        }
    }

    let mut unconnected_ports = Vec::new();
    for component in &diagram.components {
        let Some(definition) = definitions_by_type.get(component.component_type.as_str()) else {
            continue;
        };
        for port in &definition.ports {
            if !used_ports.contains(&format!("{}:{}", component.id, port.id)) {
                unconnected_ports.push(UnconnectedPort::new(&component.id, &port.id));
            }
        }
    }

    let is_valid =
        duplicate_ids.is_empty() && invalid_references.is_empty() && unconnected_ports.is_empty();

    ValidationReport {
        duplicate_ids,
        invalid_references,
        unconnected_ports,
        is_valid,
    }
}

pub fn validate_project(project: &Project, definitions: &[ComponentDefinition]) -> ValidationReport {
    validate_diagram(&project.diagram, definitions)
}

/// Ids of components whose type has no definition in the catalog, in
/// component order.
///
/// Reported separately from [`validate_diagram`]: a missing definition does
/// not make a diagram invalid.
pub fn unknown_types<'a>(diagram: &'a Diagram, definitions: &[ComponentDefinition]) -> Vec<&'a str> {
    let known: HashSet<&str> = definitions
        .iter()
        .map(|d| d.component_type.as_str())
        .collect();
    diagram
        .components
        .iter()
        .filter(|c| !known.contains(c.component_type.as_str()))
        .map(|c| c.id.as_str())
        .collect()
}

fn reference_key(connection: &Connection, side: EndpointSide, what: &str, reference: &str) -> String {
    format!(
        "connection:{}:{}.{}:{}",
        connection.id,
        side.as_str(),
        what,
        reference
    )
}
