//! sf-commands: reversible document edits and undo/redo history.
//!
//! # Example
//!
//! ```
//! use sf_commands::{CommandStack, DocumentCommand};
//! use sf_model::{NewComponent, create_default_project};
//!
//! let mut stack = CommandStack::new();
//! let project = create_default_project();
//! let project = stack.execute(
//!     DocumentCommand::add_component(NewComponent::new("c1", "Valve")),
//!     &project,
//! );
//! assert_eq!(project.diagram.components.len(), 1);
//!
//! let project = stack.undo(&project);
//! assert!(project.diagram.components.is_empty());
//! assert!(stack.can_redo());
//! ```

pub mod command;
pub mod document;
pub mod stack;

pub use command::Command;
pub use document::{
    AddComponentCommand, AddConnectionCommand, DeleteComponentCommand, DocumentCommand,
    MoveComponentCommand,
};
pub use stack::CommandStack;

/// Undo/redo history for a schematic document.
pub type DocumentHistory = CommandStack<sf_model::Project, DocumentCommand>;
