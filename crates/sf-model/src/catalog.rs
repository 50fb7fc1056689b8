//! Component definition catalog.
//!
//! The catalog is supplied by the host application and is read-only for the
//! document core. Only validation and the library browser look at it.

use serde_json::json;
use sf_core::Point;
use std::collections::HashSet;
use tracing::debug;

use crate::schema::{ComponentDefinition, Domain, EntityKind, Port, ValueMap};
use crate::{ModelError, ModelResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    definitions: Vec<ComponentDefinition>,
}

impl Catalog {
    /// Build a catalog, rejecting repeated `type` keys.
    pub fn new(definitions: Vec<ComponentDefinition>) -> ModelResult<Self> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.component_type.as_str()) {
                return Err(ModelError::DuplicateId {
                    kind: EntityKind::Definition,
                    id: definition.component_type.clone(),
                });
            }
        }
        Ok(Self { definitions })
    }

    pub fn from_yaml_str(content: &str) -> ModelResult<Self> {
        let definitions: Vec<ComponentDefinition> = serde_yaml::from_str(content)?;
        debug!(count = definitions.len(), "loaded catalog from YAML");
        Self::new(definitions)
    }

    pub fn from_json_str(content: &str) -> ModelResult<Self> {
        let definitions: Vec<ComponentDefinition> = serde_json::from_str(content)?;
        debug!(count = definitions.len(), "loaded catalog from JSON");
        Self::new(definitions)
    }

    pub fn definitions(&self) -> &[ComponentDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn get(&self, component_type: &str) -> Option<&ComponentDefinition> {
        self.definitions
            .iter()
            .find(|d| d.component_type == component_type)
    }

    /// Case-insensitive substring search over type, display name and
    /// category path. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&ComponentDefinition> {
        self.definitions
            .iter()
            .filter(|d| matches_query(d, query))
            .collect()
    }

    /// Stock definitions covering each port domain.
    pub fn builtin() -> Self {
        Self {
            definitions: vec![
                definition(
                    "Valve",
                    "Directional Valve",
                    &["Pneumatic", "Control"],
                    vec![
                        port("in", "In", "flow", (0.0, 35.0), "west", Domain::Pneumatic),
                        port("out", "Out", "flow", (150.0, 35.0), "east", Domain::Pneumatic),
                    ],
                    number_schema(&[("pressure", "bar")]),
                ),
                definition(
                    "Cylinder",
                    "Single-Acting Cylinder",
                    &["Pneumatic", "Actuators"],
                    vec![port("in", "In", "flow", (0.0, 35.0), "west", Domain::Pneumatic)],
                    number_schema(&[("stroke", "mm"), ("bore", "mm")]),
                ),
                definition(
                    "Compressor",
                    "Compressor",
                    &["Pneumatic", "Supply"],
                    vec![port("out", "Out", "flow", (150.0, 35.0), "east", Domain::Pneumatic)],
                    number_schema(&[("pressure", "bar")]),
                ),
                definition(
                    "Pump",
                    "Hydraulic Pump",
                    &["Hydraulic", "Supply"],
                    vec![
                        port("in", "Suction", "flow", (0.0, 35.0), "west", Domain::Hydraulic),
                        port("out", "Pressure", "flow", (150.0, 35.0), "east", Domain::Hydraulic),
                    ],
                    number_schema(&[("displacement", "cm3/rev")]),
                ),
                definition(
                    "Motor",
                    "DC Motor",
                    &["Electric", "Actuators"],
                    vec![
                        port("pos", "+", "terminal", (0.0, 20.0), "west", Domain::Electric),
                        port("neg", "-", "terminal", (0.0, 50.0), "west", Domain::Electric),
                    ],
                    number_schema(&[("voltage", "V")]),
                ),
                definition(
                    "Sensor",
                    "Pressure Sensor",
                    &["Digital", "Sensors"],
                    vec![
                        port("in", "Tap", "flow", (0.0, 35.0), "west", Domain::Pneumatic),
                        port("signal", "Signal", "signal", (150.0, 35.0), "east", Domain::Digital),
                    ],
                    number_schema(&[("range", "bar")]),
                ),
            ],
        }
    }
}

fn matches_query(definition: &ComponentDefinition, query: &str) -> bool {
    let query = query.trim().to_ascii_lowercase();
    if query.is_empty() {
        return true;
    }

    definition.component_type.to_ascii_lowercase().contains(&query)
        || definition.display_name.to_ascii_lowercase().contains(&query)
        || definition
            .category_path
            .iter()
            .any(|segment| segment.to_ascii_lowercase().contains(&query))
}

fn definition(
    component_type: &str,
    display_name: &str,
    category_path: &[&str],
    ports: Vec<Port>,
    parameter_schema: ValueMap,
) -> ComponentDefinition {
    ComponentDefinition {
        component_type: component_type.to_string(),
        display_name: display_name.to_string(),
        category_path: category_path.iter().map(|s| s.to_string()).collect(),
        ports,
        parameter_schema,
        icon_ref: None,
        model_ref: None,
    }
}

fn port(
    id: &str,
    name: &str,
    kind: &str,
    (x, y): (f64, f64),
    direction: &str,
    domain: Domain,
) -> Port {
    Port {
        id: id.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        position_local: Point::new(x, y),
        direction: direction.to_string(),
        domain,
    }
}

fn number_schema(fields: &[(&str, &str)]) -> ValueMap {
    fields
        .iter()
        .map(|(name, unit)| {
            (
                name.to_string(),
                json!({ "type": "number", "unit": unit }),
            )
        })
        .collect()
}
