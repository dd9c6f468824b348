//! Canonical on-disk locations for records and API artifacts.
//!
//! Nothing here touches the filesystem; every other module resolves paths
//! through these layouts instead of joining file names itself.

use std::path::{Path, PathBuf};

pub const CORE_FILENAME: &str = "core.md";
pub const DESCRIPTION_FILENAME: &str = "description.md";
pub const TWEETS_FILENAME: &str = "tweets.md";
pub const AVATAR_FILENAME: &str = "avatar.md";
pub const PROVIDERS_API_ENDPOINTS_DIRNAME: &str = "providers api endpoints";

pub const MODELS_ARTIFACT: &str = "models.json";
pub const TWEETS_ARTIFACT: &str = "tweets.json";
pub const DESCRIPTIONS_DIRNAME: &str = "descriptions";

/// Source data directory: one subdirectory per model id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DataLayout { root: root.into() }
    }

    pub fn model_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    pub fn core_path(&self, id: &str) -> PathBuf {
        self.model_dir(id).join(CORE_FILENAME)
    }

    pub fn description_path(&self, id: &str) -> PathBuf {
        self.model_dir(id).join(DESCRIPTION_FILENAME)
    }

    pub fn tweets_path(&self, id: &str) -> PathBuf {
        self.model_dir(id).join(TWEETS_FILENAME)
    }

    pub fn avatar_path(&self, id: &str) -> PathBuf {
        self.model_dir(id).join(AVATAR_FILENAME)
    }

    pub fn providers_dir(&self, id: &str) -> PathBuf {
        self.model_dir(id).join(PROVIDERS_API_ENDPOINTS_DIRNAME)
    }

    /// Provider name of an endpoint file (its stem).
    pub fn provider_name(path: &Path) -> Option<String> {
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            return None;
        }
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }
}

/// Public API output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiLayout {
    pub root: PathBuf,
}

impl ApiLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ApiLayout { root: root.into() }
    }

    pub fn models_path(&self) -> PathBuf {
        self.root.join(MODELS_ARTIFACT)
    }

    pub fn tweets_path(&self) -> PathBuf {
        self.root.join(TWEETS_ARTIFACT)
    }

    pub fn descriptions_dir(&self) -> PathBuf {
        self.root.join(DESCRIPTIONS_DIRNAME)
    }

    pub fn description_path(&self, id: &str) -> PathBuf {
        self.descriptions_dir().join(format!("{}.json", id))
    }
}
