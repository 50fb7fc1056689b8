//! Application configuration, read from an optional `schemflow.yaml`.

use serde::{Deserialize, Serialize};
use sf_core::{TransformPatch, snap};
use sf_model::Catalog;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "schemflow.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding named projects and the autosave slot.
    pub store_dir: PathBuf,
    /// Copy each edit to the autosave slot before saving it.
    pub autosave: bool,
    /// Maximum undo depth; unbounded when absent.
    pub history_limit: Option<usize>,
    /// Catalog file (`.yaml`/`.yml` or `.json`); the builtin catalog is used
    /// when absent.
    pub catalog: Option<PathBuf>,
    /// Snap placed coordinates to multiples of this step.
    pub grid_size: Option<f64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("projects"),
            autosave: true,
            history_limit: None,
            catalog: None,
            grid_size: None,
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let config: AppConfig = serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;
        if config.history_limit == Some(0) {
            return Err(AppError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        if let Some(step) = config.grid_size
            && !(step.is_finite() && step > 0.0)
        {
            return Err(AppError::Config(
                "grid_size must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = read_file(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> AppResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_catalog(&self) -> AppResult<Catalog> {
        let Some(path) = &self.catalog else {
            return Ok(Catalog::builtin());
        };
        let content = read_file(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            Catalog::from_json_str(&content)?
        } else {
            Catalog::from_yaml_str(&content)?
        };
        Ok(catalog)
    }

    /// Check a requested placement and snap its coordinates to the grid.
    pub fn place(&self, patch: TransformPatch) -> AppResult<TransformPatch> {
        patch.ensure_finite()?;
        let Some(step) = self.grid_size else {
            return Ok(patch);
        };
        Ok(TransformPatch {
            x: patch.x.map(|x| snap(x, step)).transpose()?,
            y: patch.y.map(|y| snap(y, step)).transpose()?,
            ..patch
        })
    }
}

fn read_file(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}
