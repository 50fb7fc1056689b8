use sf_model::*;
use sf_project::{
    FileStore, ProjectStore, load_project, recover_autosave, save_project, write_autosave,
};

fn sample() -> Project {
    let project = create_default_project();
    let project = add_component(&project, NewComponent::new("c1", "Valve").at(10.0, 20.0)).unwrap();
    let project = add_component(&project, NewComponent::new("c2", "Cylinder")).unwrap();
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
fn file_store_saves_and_loads_named_projects() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().join("projects")).unwrap();

    save_project(&mut store, "demo", &sample()).unwrap();
    assert!(store.document_path("demo").unwrap().exists());
    assert_eq!(load_project(&store, "demo.json").unwrap(), Some(sample()));
    assert_eq!(load_project(&store, "other").unwrap(), None);
    assert_eq!(store.list().unwrap(), vec!["demo".to_string()]);
}

#[test]
fn file_store_autosave_is_independent() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().to_path_buf()).unwrap();

    write_autosave(&mut store, &sample()).unwrap();
    assert!(store.list().unwrap().is_empty());
    assert_eq!(recover_autosave(&mut store).unwrap(), Some(sample()));

    store.clear_autosave().unwrap();
    store.clear_autosave().unwrap();
    assert_eq!(recover_autosave(&mut store).unwrap(), None);
}

#[test]
fn file_store_drops_corrupt_autosave() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().to_path_buf()).unwrap();
    store.save_autosave("{\"schemaVersion\": 1, \"project\": 3}").unwrap();

    assert_eq!(recover_autosave(&mut store).unwrap(), None);
    assert!(!dir.path().join(".autosave.json").exists());
}

#[test]
fn file_store_rejects_escaping_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().to_path_buf()).unwrap();
    assert!(store.save("../evil", "{}").is_err());
}

#[test]
fn non_finite_coordinates_are_never_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path().to_path_buf()).unwrap();
    let mut project = sample();
    project.diagram.components[0].transform.x = f64::NAN;

    assert!(matches!(
        save_project(&mut store, "broken", &project),
        Err(sf_project::ProjectError::NonFinite(_))
    ));
    assert!(matches!(
        write_autosave(&mut store, &project),
        Err(sf_project::ProjectError::NonFinite(_))
    ));
    assert!(store.list().unwrap().is_empty());
    assert_eq!(store.load_autosave().unwrap(), None);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
