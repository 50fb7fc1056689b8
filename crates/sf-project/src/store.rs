//! Storage backends for serialized projects.
//!
//! The core only needs two operations on named documents plus a separate
//! autosave slot. Stores deal in serialized text and never look inside it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ProjectError, ProjectResult};

const PROJECT_EXTENSION: &str = "json";
const AUTOSAVE_FILE: &str = ".autosave.json";

pub trait ProjectStore {
    /// Store `text` under `name`, replacing any previous content.
    fn save(&mut self, name: &str, text: &str) -> ProjectResult<()>;

    /// Text stored under `name`, or `None` when nothing is stored.
    fn load(&self, name: &str) -> ProjectResult<Option<String>>;

    /// Names of all stored documents, sorted.
    fn list(&self) -> ProjectResult<Vec<String>>;

    fn save_autosave(&mut self, text: &str) -> ProjectResult<()>;

    fn load_autosave(&self) -> ProjectResult<Option<String>>;

    fn clear_autosave(&mut self) -> ProjectResult<()>;
}

/// In-process store, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, String>,
    autosave: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn save(&mut self, name: &str, text: &str) -> ProjectResult<()> {
        let name = document_name(name)?;
        self.documents.insert(name.to_string(), text.to_string());
        Ok(())
    }

    fn load(&self, name: &str) -> ProjectResult<Option<String>> {
        let name = document_name(name)?;
        Ok(self.documents.get(name).cloned())
    }

    fn list(&self) -> ProjectResult<Vec<String>> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn save_autosave(&mut self, text: &str) -> ProjectResult<()> {
        self.autosave = Some(text.to_string());
        Ok(())
    }

    fn load_autosave(&self) -> ProjectResult<Option<String>> {
        Ok(self.autosave.clone())
    }

    fn clear_autosave(&mut self) -> ProjectResult<()> {
        self.autosave = None;
        Ok(())
    }
}

/// Directory-backed store. Documents live at `<root>/<name>.json`, the
/// autosave slot at `<root>/.autosave.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    pub fn new(root_dir: PathBuf) -> ProjectResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn document_path(&self, name: &str) -> ProjectResult<PathBuf> {
        let name = document_name(name)?;
        Ok(self
            .root_dir
            .join(format!("{}.{}", name, PROJECT_EXTENSION)))
    }

    fn autosave_path(&self) -> PathBuf {
        self.root_dir.join(AUTOSAVE_FILE)
    }
}

impl ProjectStore for FileStore {
    fn save(&mut self, name: &str, text: &str) -> ProjectResult<()> {
        let path = self.document_path(name)?;
        write_whole(&path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "saved project");
        Ok(())
    }

    fn load(&self, name: &str) -> ProjectResult<Option<String>> {
        read_if_present(&self.document_path(name)?)
    }

    fn list(&self) -> ProjectResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(PROJECT_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && !stem.starts_with('.')
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn save_autosave(&mut self, text: &str) -> ProjectResult<()> {
        write_whole(&self.autosave_path(), text)
    }

    fn load_autosave(&self) -> ProjectResult<Option<String>> {
        read_if_present(&self.autosave_path())
    }

    fn clear_autosave(&mut self) -> ProjectResult<()> {
        match fs::remove_file(self.autosave_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Accepts `demo` or `demo.json`; rejects anything that could escape the
/// store root.
fn document_name(name: &str) -> ProjectResult<&str> {
    let trimmed = name
        .strip_suffix(".json")
        .unwrap_or(name)
        .trim();
    let invalid = trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.contains(['/', '\\'])
        || trimmed.contains("..");
    if invalid {
        return Err(ProjectError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(trimmed)
}

/// Write to a sibling temp file and rename over the target, so readers see
/// either the old content or the new content.
fn write_whole(path: &Path, text: &str) -> ProjectResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn read_if_present(path: &Path) -> ProjectResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
