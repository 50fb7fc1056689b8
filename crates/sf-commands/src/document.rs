//! Concrete document commands.
//!
//! Each command captures the minimum state needed to reverse itself at the
//! moment it executes. A command whose target is missing (or whose edit is
//! rejected by the model) turns into a no-op for both directions.

use sf_core::{Transform, TransformPatch};
use sf_model::{
    ComponentInstance, Connection, ModelResult, NewComponent, Project, add_component,
    add_connection, check_add_component, check_add_connection, move_component, remove_component,
    remove_connection,
};
use tracing::warn;

use crate::command::Command;

#[derive(Debug, Clone, PartialEq)]
pub struct AddComponentCommand {
    component: NewComponent,
    applied: bool,
}

impl AddComponentCommand {
    pub fn new(component: NewComponent) -> Self {
        Self {
            component,
            applied: false,
        }
    }

    pub fn component_id(&self) -> &str {
        &self.component.id
    }
}

impl Command<Project> for AddComponentCommand {
    fn execute(&mut self, state: &Project) -> Project {
        match add_component(state, self.component.clone()) {
            Ok(next) => {
                self.applied = true;
                next
            }
            Err(err) => {
                warn!(%err, "add component skipped");
                self.applied = false;
                state.clone()
            }
        }
    }

    fn undo(&mut self, state: &Project) -> Project {
        if !self.applied {
            return state.clone();
        }
        remove_component(state, &self.component.id)
    }

    fn name(&self) -> &'static str {
        "add-component"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveComponentCommand {
    component_id: String,
    patch: TransformPatch,
    previous: Option<Transform>,
}

impl MoveComponentCommand {
    pub fn new(component_id: impl Into<String>, patch: TransformPatch) -> Self {
        Self {
            component_id: component_id.into(),
            patch,
            previous: None,
        }
    }

    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Transform captured by the last execute, if the target existed.
    pub fn previous(&self) -> Option<&Transform> {
        self.previous.as_ref()
    }
}

impl Command<Project> for MoveComponentCommand {
    fn execute(&mut self, state: &Project) -> Project {
        self.previous = state
            .diagram
            .component(&self.component_id)
            .map(|c| c.transform);
        if self.previous.is_none() {
            return state.clone();
        }
        move_component(state, &self.component_id, &self.patch)
    }

    fn undo(&mut self, state: &Project) -> Project {
        match self.previous {
            Some(previous) => move_component(state, &self.component_id, &previous.into()),
            None => state.clone(),
        }
    }

    fn name(&self) -> &'static str {
        "move-component"
    }
}

/// A component and the connections that went with it.
#[derive(Debug, Clone, PartialEq)]
struct Removed {
    component: ComponentInstance,
    connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteComponentCommand {
    component_id: String,
    removed: Option<Removed>,
}

impl DeleteComponentCommand {
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            removed: None,
        }
    }

    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Connections captured by the last execute.
    pub fn removed_connections(&self) -> &[Connection] {
        self.removed
            .as_ref()
            .map(|r| r.connections.as_slice())
            .unwrap_or_default()
    }
}

impl Command<Project> for DeleteComponentCommand {
    fn execute(&mut self, state: &Project) -> Project {
        let Some(component) = state.diagram.component(&self.component_id) else {
            self.removed = None;
            return state.clone();
        };

        self.removed = Some(Removed {
            component: component.clone(),
            connections: state
                .diagram
                .connections_touching(&self.component_id)
                .cloned()
                .collect(),
        });
        remove_component(state, &self.component_id)
    }

    fn undo(&mut self, state: &Project) -> Project {
        let Some(removed) = &self.removed else {
            return state.clone();
        };

        // Re-appended at the end; original positions are not kept.
        let mut next = state.clone();
        next.diagram.components.push(removed.component.clone());
        next.diagram
            .connections
            .extend(removed.connections.iter().cloned());
        next
    }

    fn name(&self) -> &'static str {
        "delete-component"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddConnectionCommand {
    connection: Connection,
    applied: bool,
}

impl AddConnectionCommand {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            applied: false,
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection.id
    }
}

impl Command<Project> for AddConnectionCommand {
    fn execute(&mut self, state: &Project) -> Project {
        match add_connection(state, self.connection.clone()) {
            Ok(next) => {
                self.applied = true;
                next
            }
            Err(err) => {
                warn!(%err, "add connection skipped");
                self.applied = false;
                state.clone()
            }
        }
    }

    fn undo(&mut self, state: &Project) -> Project {
        if !self.applied {
            return state.clone();
        }
        remove_connection(state, &self.connection.id)
    }

    fn name(&self) -> &'static str {
        "add-connection"
    }
}

/// The closed set of edits the editor can record.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentCommand {
    AddComponent(AddComponentCommand),
    MoveComponent(MoveComponentCommand),
    DeleteComponent(DeleteComponentCommand),
    AddConnection(AddConnectionCommand),
}

impl DocumentCommand {
    pub fn add_component(component: NewComponent) -> Self {
        Self::AddComponent(AddComponentCommand::new(component))
    }

    pub fn move_component(component_id: impl Into<String>, patch: TransformPatch) -> Self {
        Self::MoveComponent(MoveComponentCommand::new(component_id, patch))
    }

    pub fn delete_component(component_id: impl Into<String>) -> Self {
        Self::DeleteComponent(DeleteComponentCommand::new(component_id))
    }

    pub fn add_connection(connection: Connection) -> Self {
        Self::AddConnection(AddConnectionCommand::new(connection))
    }

    /// The error `execute` would swallow against `state`, if any.
    ///
    /// Moves and deletes of a missing component stay no-ops and pass.
    pub fn check(&self, state: &Project) -> ModelResult<()> {
        match self {
            DocumentCommand::AddComponent(cmd) => check_add_component(state, &cmd.component),
            DocumentCommand::MoveComponent(cmd) => Ok(cmd.patch.ensure_finite()?),
            DocumentCommand::DeleteComponent(_) => Ok(()),
            DocumentCommand::AddConnection(cmd) => check_add_connection(state, &cmd.connection),
        }
    }
}

impl Command<Project> for DocumentCommand {
    fn execute(&mut self, state: &Project) -> Project {
        match self {
            DocumentCommand::AddComponent(cmd) => cmd.execute(state),
            DocumentCommand::MoveComponent(cmd) => cmd.execute(state),
            DocumentCommand::DeleteComponent(cmd) => cmd.execute(state),
            DocumentCommand::AddConnection(cmd) => cmd.execute(state),
        }
    }

    fn undo(&mut self, state: &Project) -> Project {
        match self {
            DocumentCommand::AddComponent(cmd) => cmd.undo(state),
            DocumentCommand::MoveComponent(cmd) => cmd.undo(state),
            DocumentCommand::DeleteComponent(cmd) => cmd.undo(state),
            DocumentCommand::AddConnection(cmd) => cmd.undo(state),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DocumentCommand::AddComponent(cmd) => cmd.name(),
            DocumentCommand::MoveComponent(cmd) => cmd.name(),
            DocumentCommand::DeleteComponent(cmd) => cmd.name(),
            DocumentCommand::AddConnection(cmd) => cmd.name(),
        }
    }
}

impl From<AddComponentCommand> for DocumentCommand {
    fn from(cmd: AddComponentCommand) -> Self {
        Self::AddComponent(cmd)
    }
}

impl From<MoveComponentCommand> for DocumentCommand {
    fn from(cmd: MoveComponentCommand) -> Self {
        Self::MoveComponent(cmd)
    }
}

impl From<DeleteComponentCommand> for DocumentCommand {
    fn from(cmd: DeleteComponentCommand) -> Self {
        Self::DeleteComponent(cmd)
    }
}

impl From<AddConnectionCommand> for DocumentCommand {
    fn from(cmd: AddConnectionCommand) -> Self {
        Self::AddConnection(cmd)
    }
}
