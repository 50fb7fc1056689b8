//! Editor session: one open document with its history and storage.

use sf_commands::{Command, DocumentCommand, DocumentHistory};
use sf_model::schema::DEFAULT_PROJECT_VERSION;
use sf_model::{
    Catalog, Project, ValidationReport, ValueMap, create_default_project, create_empty_project,
    validate_project,
};
use sf_project::{ProjectStore, load_project, recover_autosave, save_project, write_autosave};
use std::fmt;
use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, diagnostics_for};
use crate::error::{AppError, AppResult};

/// Properties of a single component, as shown in a properties panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSummary {
    pub id: String,
    pub component_type: String,
    /// From the catalog, when the type is known.
    pub display_name: Option<String>,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub rot: f64,
    pub connection_count: usize,
}

/// Status bar contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub diagnostics: usize,
    pub file_name: Option<String>,
    pub dirty: bool,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Diagnostics: {} | File: {}{}",
            self.diagnostics,
            self.file_name.as_deref().unwrap_or("untitled"),
            if self.dirty { " *" } else { "" }
        )
    }
}

pub struct EditorSession<S: ProjectStore> {
    store: S,
    catalog: Catalog,
    project: Project,
    history: DocumentHistory,
    current_name: Option<String>,
    dirty: bool,
}

impl<S: ProjectStore> EditorSession<S> {
    /// Start with an empty, unnamed document.
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self {
            store,
            catalog,
            project: create_default_project(),
            history: DocumentHistory::new(),
            current_name: None,
            dirty: false,
        }
    }

    /// Cap the undo depth. Clears existing history.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = match limit {
            Some(limit) => DocumentHistory::with_limit(limit),
            None => DocumentHistory::new(),
        };
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the document with an empty, unnamed one.
    pub fn new_document(&mut self, metadata: ValueMap) {
        self.replace_document(create_empty_project(metadata, DEFAULT_PROJECT_VERSION), None);
        self.dirty = false;
        debug!("new document");
    }

    pub fn open(&mut self, name: &str) -> AppResult<()> {
        let project = load_project(&self.store, name)?
            .ok_or_else(|| AppError::ProjectNotFound(name.to_string()))?;
        self.replace_document(project, Some(name));
        self.dirty = false;
        info!(name, "opened project");
        Ok(())
    }

    /// Save under the current name and clear the autosave slot.
    pub fn save(&mut self) -> AppResult<()> {
        let name = self.current_name.clone().ok_or(AppError::Unnamed)?;
        self.write(&name)
    }

    pub fn save_as(&mut self, name: &str) -> AppResult<()> {
        self.write(name)?;
        self.current_name = Some(name.to_string());
        Ok(())
    }

    pub fn execute(&mut self, command: DocumentCommand) {
        let next = self.history.execute(command, &self.project);
        self.commit(next);
    }

    /// Like [`execute`](Self::execute), but a rejected edit is returned as an
    /// error and never reaches the history.
    pub fn try_execute(&mut self, command: DocumentCommand) -> AppResult<()> {
        command.check(&self.project).inspect_err(|err| {
            debug!(command = command.name(), %err, "edit rejected");
        })?;
        self.execute(command);
        Ok(())
    }

    pub fn undo(&mut self) {
        if !self.history.can_undo() {
            return;
        }
        let next = self.history.undo(&self.project);
        self.commit(next);
    }

    pub fn redo(&mut self) {
        if !self.history.can_redo() {
            return;
        }
        let next = self.history.redo(&self.project);
        self.commit(next);
    }

    pub fn validate(&self) -> ValidationReport {
        validate_project(&self.project, self.catalog.definitions())
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        diagnostics_for(&self.validate(), &self.project.diagram)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            diagnostics: self.validate().issue_count(),
            file_name: self.current_name.clone(),
            dirty: self.dirty,
        }
    }

    pub fn component_summary(&self, component_id: &str) -> AppResult<ComponentSummary> {
        let component = self
            .project
            .diagram
            .component(component_id)
            .ok_or_else(|| AppError::ComponentNotFound(component_id.to_string()))?;
        Ok(ComponentSummary {
            id: component.id.clone(),
            component_type: component.component_type.clone(),
            display_name: self
                .catalog
                .get(&component.component_type)
                .map(|d| d.display_name.clone()),
            label: component.label.clone(),
            x: component.transform.x,
            y: component.transform.y,
            rot: component.transform.rot,
            connection_count: self
                .project
                .diagram
                .connections_touching(component_id)
                .count(),
        })
    }

    /// Write the current snapshot to the autosave slot. History and the
    /// dirty flag are untouched.
    pub fn autosave(&mut self) -> AppResult<()> {
        write_autosave(&mut self.store, &self.project)?;
        Ok(())
    }

    /// Replace the document with the autosaved one, if a readable one
    /// exists. History starts over and the document counts as unsaved.
    pub fn recover_autosave(&mut self) -> AppResult<bool> {
        let Some(project) = recover_autosave(&mut self.store)? else {
            return Ok(false);
        };
        let name = self.current_name.clone();
        self.replace_document(project, name.as_deref());
        self.dirty = true;
        info!("recovered autosaved project");
        Ok(true)
    }

    fn write(&mut self, name: &str) -> AppResult<()> {
        save_project(&mut self.store, name, &self.project)?;
        self.store.clear_autosave()?;
        self.dirty = false;
        info!(name, "saved project");
        Ok(())
    }

    fn replace_document(&mut self, project: Project, name: Option<&str>) {
        self.project = project;
        self.history.clear();
        self.current_name = name.map(str::to_string);
    }

    fn commit(&mut self, next: Project) {
        if next != self.project {
            self.dirty = true;
        }
        self.project = next;
    }
}
