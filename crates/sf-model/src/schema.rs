//! Document schema definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sf_core::{Point, Transform, TransformPatch};

/// Open key/value bag used for project metadata and parameter values.
pub type ValueMap = Map<String, Value>;

pub const DEFAULT_PROJECT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Pneumatic,
    Hydraulic,
    Electric,
    Digital,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Domain::Pneumatic => "pneumatic",
            Domain::Hydraulic => "hydraulic",
            Domain::Electric => "electric",
            Domain::Digital => "digital",
        };
        f.write_str(name)
    }
}

/// A named connection point declared by a [`ComponentDefinition`].
///
/// `id` is unique within the owning definition only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub position_local: Point,
    pub direction: String,
    pub domain: Domain,
}

/// Catalog entry describing a component kind. Supplied externally and never
/// saved with the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    #[serde(rename = "type")]
    pub component_type: String,
    pub display_name: String,
    #[serde(default)]
    pub category_path: Vec<String>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub parameter_schema: ValueMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_ref: Option<String>,
}

impl ComponentDefinition {
    pub fn port(&self, port_id: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == port_id)
    }

    pub fn has_port(&self, port_id: &str) -> bool {
        self.port(port_id).is_some()
    }
}

/// A placed component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub transform: Transform,
    #[serde(default)]
    pub parameter_values: ValueMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ComponentInstance {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            transform: Transform::IDENTITY,
            parameter_values: ValueMap::new(),
            label: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameter_values.insert(key.into(), value);
        self
    }
}

/// Input to [`crate::add_component`]: a component whose transform may be
/// partially specified.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub transform: TransformPatch,
    #[serde(default)]
    pub parameter_values: ValueMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NewComponent {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.transform.x = Some(x);
        self.transform.y = Some(y);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Resolve the partial transform against the zero transform.
    pub fn into_instance(self) -> ComponentInstance {
        ComponentInstance {
            id: self.id,
            component_type: self.component_type,
            transform: self.transform.resolve(),
            parameter_values: self.parameter_values,
            label: self.label,
        }
    }
}

impl From<ComponentInstance> for NewComponent {
    fn from(component: ComponentInstance) -> Self {
        Self {
            id: component.id,
            component_type: component.component_type,
            transform: component.transform.into(),
            parameter_values: component.parameter_values,
            label: component.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEndpoint {
    pub component_id: String,
    pub port_id: String,
}

impl ConnectionEndpoint {
    pub fn new(component_id: impl Into<String>, port_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            port_id: port_id.into(),
        }
    }

    /// `<componentId>:<portId>`
    pub fn key(&self) -> String {
        format!("{}:{}", self.component_id, self.port_id)
    }
}

/// Which end of a connection an endpoint sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    From,
    To,
}

impl EndpointSide {
    /// Key fragment used in diagnostics (`from` / `to`).
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointSide::From => "from",
            EndpointSide::To => "to",
        }
    }
}

impl std::fmt::Display for EndpointSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointSide::From => f.write_str("source"),
            EndpointSide::To => f.write_str("target"),
        }
    }
}

/// Kinds of identified things in a document, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Component,
    Connection,
    Definition,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Component => f.write_str("Component"),
            EntityKind::Connection => f.write_str("Connection"),
            EntityKind::Definition => f.write_str("Component definition"),
        }
    }
}

/// Directed link between two component ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub from: ConnectionEndpoint,
    pub to: ConnectionEndpoint,
    #[serde(default)]
    pub routing_points: Vec<Point>,
}

impl Connection {
    pub fn new(id: impl Into<String>, from: ConnectionEndpoint, to: ConnectionEndpoint) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            routing_points: Vec::new(),
        }
    }

    pub fn endpoint(&self, side: EndpointSide) -> &ConnectionEndpoint {
        match side {
            EndpointSide::From => &self.from,
            EndpointSide::To => &self.to,
        }
    }

    pub fn touches(&self, component_id: &str) -> bool {
        self.from.component_id == component_id || self.to.component_id == component_id
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub components: Vec<ComponentInstance>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Diagram {
    pub fn component(&self, id: &str) -> Option<&ComponentInstance> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Connections with `component_id` as either endpoint, in list order.
    pub fn connections_touching<'a>(
        &'a self,
        component_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .iter()
            .filter(move |c| c.touches(component_id))
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.connections.is_empty()
    }
}

/// The full document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub metadata: ValueMap,
    /// Free-form document version, unrelated to the file schema version.
    pub version: String,
    pub diagram: Diagram,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            metadata: ValueMap::new(),
            version: DEFAULT_PROJECT_VERSION.to_string(),
            diagram: Diagram::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn component_serializes_with_type_key() {
        let component = ComponentInstance::new("c1", "Valve");
        let value = serde_json::to_value(&component).unwrap();
        assert_eq!(value["type"], "Valve");
        assert_eq!(value["parameterValues"], json!({}));
        assert!(value.get("label").is_none());
    }

    #[test]
    fn connection_uses_camel_case_endpoints() {
        let conn = Connection::new(
            "conn-1",
            ConnectionEndpoint::new("c1", "out"),
            ConnectionEndpoint::new("c2", "in"),
        );
        let value = serde_json::to_value(&conn).unwrap();
        assert_eq!(value["from"]["componentId"], "c1");
        assert_eq!(value["to"]["portId"], "in");
        assert_eq!(value["routingPoints"], json!([]));
    }

    #[test]
    fn new_component_fills_missing_transform_fields() {
        let instance = NewComponent::new("c1", "Valve").at(20.0, 40.0).into_instance();
        assert_eq!(instance.transform, Transform::at(20.0, 40.0));
    }

    #[test]
    fn instance_converts_back_to_full_patch() {
        let instance = ComponentInstance::new("c1", "Valve")
            .with_transform(Transform::at(5.0, 6.0))
            .with_label("V1");
        let again = NewComponent::from(instance.clone()).into_instance();
        assert_eq!(again, instance);
    }

    #[test]
    fn domain_is_lowercase_on_the_wire() {
        let value = serde_json::to_value(Domain::Hydraulic).unwrap();
        assert_eq!(value, json!("hydraulic"));
    }

    #[test]
    fn endpoint_key_joins_ids() {
        assert_eq!(ConnectionEndpoint::new("c1", "out").key(), "c1:out");
    }
}
