//! Autosave slot handling.
//!
//! The autosave slot is independent of named documents and of undo history.
//! A payload that cannot be decoded is cleared and reported as absent.

use sf_model::Project;
use tracing::{debug, warn};

use crate::envelope::{deserialize_project, serialize_project};
use crate::store::ProjectStore;
use crate::ProjectResult;

/// Serialize the given snapshot into the autosave slot.
pub fn write_autosave(store: &mut dyn ProjectStore, project: &Project) -> ProjectResult<()> {
    let text = serialize_project(project)?;
    store.save_autosave(&text)?;
    debug!(bytes = text.len(), "autosaved project");
    Ok(())
}

/// The autosaved project, if a readable one exists.
pub fn recover_autosave(store: &mut dyn ProjectStore) -> ProjectResult<Option<Project>> {
    let Some(text) = store.load_autosave()? else {
        return Ok(None);
    };

    match deserialize_project(&text) {
        Ok(project) => Ok(Some(project)),
        Err(err) => {
            warn!(%err, "discarding corrupt autosave");
            store.clear_autosave()?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use sf_model::{NewComponent, add_component, create_default_project};

    #[test]
    fn round_trips_through_slot() {
        let mut store = MemoryStore::new();
        let project =
            add_component(&create_default_project(), NewComponent::new("c1", "Valve")).unwrap();
        write_autosave(&mut store, &project).unwrap();
        assert_eq!(recover_autosave(&mut store).unwrap(), Some(project));
    }

    #[test]
    fn empty_slot_is_none() {
        let mut store = MemoryStore::new();
        assert_eq!(recover_autosave(&mut store).unwrap(), None);
    }

    #[test]
    fn corrupt_payload_is_cleared() {
        let mut store = MemoryStore::new();
        store.save_autosave("{ not json").unwrap();
        assert_eq!(recover_autosave(&mut store).unwrap(), None);
        assert!(store.load_autosave().unwrap().is_none());
    }

    #[test]
    fn payload_without_schema_version_is_cleared() {
        let mut store = MemoryStore::new();
        store.save_autosave(r#"{"project": {}}"#).unwrap();
        assert_eq!(recover_autosave(&mut store).unwrap(), None);
        assert!(store.load_autosave().unwrap().is_none());
    }
}
