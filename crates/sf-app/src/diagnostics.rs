//! Flattening of a [`ValidationReport`] into display items.

use serde::Serialize;
use sf_model::{Connection, Diagram, EndpointSide, ValidationReport};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCategory {
    DuplicateId,
    InvalidReference,
    UnconnectedPort,
}

impl DiagnosticCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::DuplicateId => "duplicate-id",
            DiagnosticCategory::InvalidReference => "invalid-reference",
            DiagnosticCategory::UnconnectedPort => "unconnected-port",
        }
    }

    /// Human-facing heading.
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticCategory::DuplicateId => "Duplicate ID",
            DiagnosticCategory::InvalidReference => "Invalid Connection",
            DiagnosticCategory::UnconnectedPort => "Unconnected Port",
        }
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Unique within one report.
    pub id: String,
    pub category: DiagnosticCategory,
    pub message: String,
    /// Component to focus when the item is selected, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category.label(), self.message)
    }
}

/// One item per report entry, in report order: duplicates, invalid
/// references, then unconnected ports.
pub fn diagnostics_for(report: &ValidationReport, diagram: &Diagram) -> Vec<Diagnostic> {
    let mut items = Vec::with_capacity(report.issue_count());

    for key in &report.duplicate_ids {
        let (message, component_id) = match key.split_once(':') {
            Some(("component", id)) => (
                format!("Component id \"{}\" is used more than once", id),
                Some(id.to_string()),
            ),
            Some(("connection", id)) => (
                format!("Connection id \"{}\" is used more than once", id),
                None,
            ),
            _ => (key.clone(), None),
        };
        items.push(Diagnostic {
            id: format!("{}:{}", DiagnosticCategory::DuplicateId, key),
            category: DiagnosticCategory::DuplicateId,
            message,
            component_id,
        });
    }

    for key in &report.invalid_references {
        let (message, component_id) =
            describe_reference(key, diagram).unwrap_or_else(|| (key.clone(), None));
        items.push(Diagnostic {
            id: format!("{}:{}", DiagnosticCategory::InvalidReference, key),
            category: DiagnosticCategory::InvalidReference,
            message,
            component_id,
        });
    }

    for port in &report.unconnected_ports {
        items.push(Diagnostic {
            id: format!(
                "{}:{}:{}",
                DiagnosticCategory::UnconnectedPort,
                port.component_id,
                port.port_id
            ),
            category: DiagnosticCategory::UnconnectedPort,
            message: format!(
                "Port \"{}\" on component \"{}\" is not connected",
                port.port_id, port.component_id
            ),
            component_id: Some(port.component_id.clone()),
        });
    }

    items
}

/// Decode `connection:<id>:<side>.<what>:<ref>`. Ids may themselves contain
/// `:`, so the connection is matched against the diagram rather than split,
/// longest id first.
fn describe_reference(key: &str, diagram: &Diagram) -> Option<(String, Option<String>)> {
    let rest = key.strip_prefix("connection:")?;
    let mut candidates: Vec<_> = diagram
        .connections
        .iter()
        .filter_map(|c| {
            rest.strip_prefix(c.id.as_str())
                .and_then(|t| t.strip_prefix(':'))
                .map(|t| (c, t))
        })
        .collect();
    candidates.sort_by_key(|(c, _)| std::cmp::Reverse(c.id.len()));
    candidates
        .into_iter()
        .find_map(|(connection, tail)| describe_slot(connection, tail))
}

fn describe_slot(connection: &Connection, tail: &str) -> Option<(String, Option<String>)> {
    let (slot, reference) = tail.split_once(':')?;
    let (side, what) = slot.split_once('.')?;
    let side = match side {
        "from" => EndpointSide::From,
        "to" => EndpointSide::To,
        _ => return None,
    };

    match what {
        "component" => Some((
            format!(
                "Connection \"{}\" {} references missing component \"{}\"",
                connection.id, side, reference
            ),
            None,
        )),
        "port" => {
            let owner = &connection.endpoint(side).component_id;
            Some((
                format!(
                    "Connection \"{}\" {} references unknown port \"{}\" on component \"{}\"",
                    connection.id, side, reference, owner
                ),
                Some(owner.clone()),
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_model::*;

    #[test]
    fn labels_match_categories() {
        assert_eq!(DiagnosticCategory::DuplicateId.label(), "Duplicate ID");
        assert_eq!(DiagnosticCategory::InvalidReference.label(), "Invalid Connection");
        assert_eq!(DiagnosticCategory::UnconnectedPort.label(), "Unconnected Port");
    }

    #[test]
    fn flattens_every_report_entry() {
        let diagram = Diagram {
            components: vec![
                ComponentInstance::new("c1", "Valve"),
                ComponentInstance::new("c1", "Valve"),
            ],
            connections: vec![
                Connection::new(
                    "k:1",
                    ConnectionEndpoint::new("c1", "nope"),
                    ConnectionEndpoint::new("ghost", "in"),
                ),
            ],
        };
        let report = validate_diagram(&diagram, Catalog::builtin().definitions());
        let items = diagnostics_for(&report, &diagram);

        assert_eq!(items.len(), report.issue_count());
        assert_eq!(items[0].category, DiagnosticCategory::DuplicateId);
        assert_eq!(items[0].component_id.as_deref(), Some("c1"));

        let missing = &items[1];
        assert_eq!(missing.category, DiagnosticCategory::InvalidReference);
        assert_eq!(
            missing.message,
            "Connection \"k:1\" target references missing component \"ghost\""
        );
        assert!(missing.component_id.is_none());

        let bad_port = &items[2];
        assert_eq!(bad_port.component_id.as_deref(), Some("c1"));
        assert!(bad_port.message.contains("unknown port \"nope\""));

        let last = items.last().unwrap();
        assert_eq!(last.category, DiagnosticCategory::UnconnectedPort);
        assert_eq!(last.to_string(), "Unconnected Port: Port \"out\" on component \"c1\" is not connected");
    }

    #[test]
    fn reference_keys_resolve_to_the_longest_matching_id() {
        let diagram = Diagram {
            components: vec![
                ComponentInstance::new("c1", "Valve"),
                ComponentInstance::new("c2", "Cylinder"),
            ],
            connections: vec![
                Connection::new(
                    "k",
                    ConnectionEndpoint::new("c1", "out"),
                    ConnectionEndpoint::new("c2", "in"),
                ),
                Connection::new(
                    "k:1",
                    ConnectionEndpoint::new("c1", "out"),
                    ConnectionEndpoint::new("ghost", "in"),
                ),
            ],
        };
        let report = validate_diagram(&diagram, Catalog::builtin().definitions());
        let items = diagnostics_for(&report, &diagram);

        let missing: Vec<_> = items
            .iter()
            .filter(|d| d.category == DiagnosticCategory::InvalidReference)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(
            missing[0].message,
            "Connection \"k:1\" target references missing component \"ghost\""
        );
    }

    #[test]
    fn valid_report_has_no_items() {
        let report = ValidationReport {
            is_valid: true,
            ..ValidationReport::default()
        };
        assert!(diagnostics_for(&report, &Diagram::default()).is_empty());
    }
}
