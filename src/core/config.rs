//! Configuration for catalog commands.
//!
//! Resolution order, later wins: built-in defaults, `modelbook.toml`,
//! `MODELBOOK_*` environment variables, command-line flags.

use crate::core::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "modelbook.toml";

pub const ENV_DATA_DIR: &str = "MODELBOOK_DATA_DIR";
pub const ENV_API_DIR: &str = "MODELBOOK_API_DIR";
pub const ENV_LOG: &str = "MODELBOOK_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory holding one subdirectory per model.
    pub data_dir: PathBuf,
    /// Directory the public API artifacts are written to.
    pub api_dir: PathBuf,
    /// `tracing` filter expression.
    pub log: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            data_dir: PathBuf::from("data"),
            api_dir: PathBuf::from("public/api"),
            log: "warn".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn parse(content: &str, file: &Path) -> Result<Self, CatalogError> {
        toml::from_str(content).map_err(|e| CatalogError::Config {
            file: file.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load `explicit` if given (it must exist), otherwise
    /// `<root>/modelbook.toml` when present, otherwise defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, CatalogError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let candidate = root.join(CONFIG_FILENAME);
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(CatalogError::io_at(&path))?;
                Self::parse(&content, &path)?
            }
            None => CatalogConfig::default(),
        };

        config.apply_env(|name| std::env::var(name).ok());
        config.data_dir = absolutize(root, &config.data_dir);
        config.api_dir = absolutize(root, &config.api_dir);
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(dir) = value(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = value(ENV_API_DIR) {
            self.api_dir = PathBuf::from(dir);
        }
        if let Some(level) = value(ENV_LOG) {
            self.log = level;
        }
    }
}

fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Read a variable an external collaborator needs; blank counts as unset.
pub fn require_env(name: &str) -> Result<String, CatalogError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CatalogError::MissingEnvironment(name.to_string())),
    }
}
