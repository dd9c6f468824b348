//! Public API build: scans every model directory, merges its records and
//! writes the JSON artifacts.
//!
//! The scan happens entirely in memory before anything is written, so a
//! failing record leaves the previous artifacts untouched.

use crate::core::error::CatalogError;
use crate::core::markdown;
use crate::core::paths::{ApiLayout, DataLayout};
use crate::core::records::{AvatarRecord, ModelCore, ProviderEndpoints, TweetsRecord};
use crate::core::schema::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub type ProvidersApiEndpoints = BTreeMap<String, ProviderEndpoints>;

/// One entry of `models.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOutput {
    #[serde(flatten)]
    pub core: ModelCore,
    #[serde(
        rename = "providers api endpoints",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub providers_api_endpoints: Option<ProvidersApiEndpoints>,
    #[serde(rename = "avatar generated")]
    pub avatar_generated: bool,
}

/// One file under `descriptions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionArtifact {
    pub id: String,
    pub content: String,
}

/// Everything the artifacts are rendered from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Sorted with [`compare_models`].
    pub models: Vec<ModelOutput>,
    pub tweets: BTreeMap<String, Vec<String>>,
    pub descriptions: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub models: usize,
    pub tweets: usize,
    pub descriptions: usize,
    pub models_path: PathBuf,
    pub tweets_path: PathBuf,
    pub descriptions_dir: PathBuf,
}

fn read_record<R: Record>(path: &Path) -> Result<R, CatalogError> {
    let content = fs::read_to_string(path).map_err(CatalogError::io_at(path))?;
    markdown::decode(&content).map_err(|v| CatalogError::validation(path, v))
}

fn read_optional_record<R: Record>(path: &Path) -> Result<Option<R>, CatalogError> {
    if !path.is_file() {
        return Ok(None);
    }
    read_record(path).map(Some)
}

/// Model ids present in the data directory: every subdirectory holding a
/// core record, sorted by name.
pub fn list_model_ids(layout: &DataLayout) -> Result<Vec<String>, CatalogError> {
    let entries = fs::read_dir(&layout.root).map_err(CatalogError::io_at(&layout.root))?;
    let mut ids = Vec::new();

    for entry in entries {
        let entry = entry.map_err(CatalogError::io_at(&layout.root))?;
        if !entry.path().is_dir() {
            continue;
        }
        let Some(id) = entry.file_name().to_str().map(str::to_string) else {
            warn!(dir = %entry.path().display(), "skipping non UTF-8 model directory");
            continue;
        };
        if layout.core_path(&id).is_file() {
            ids.push(id);
        }
    }

    ids.sort();
    Ok(ids)
}

/// Load and validate a core record, checking its `id` against the
/// directory it was found in.
pub fn load_model_core(layout: &DataLayout, id: &str) -> Result<ModelCore, CatalogError> {
    let path = layout.core_path(id);
    let core: ModelCore = read_record(&path)?;
    if core.id != id {
        return Err(CatalogError::ConsistencyError {
            file: path,
            expected: id.to_string(),
            found: core.id,
        });
    }
    Ok(core)
}

pub fn has_generated_avatar(layout: &DataLayout, id: &str) -> Result<bool, CatalogError> {
    Ok(read_optional_record::<AvatarRecord>(&layout.avatar_path(id))?
        .is_some_and(|avatar| avatar.is_generated()))
}

/// Providers with at least one endpoint, or `None` when no provider
/// qualifies (including when the directory does not exist).
pub fn load_providers_api_endpoints(
    layout: &DataLayout,
    id: &str,
) -> Result<Option<ProvidersApiEndpoints>, CatalogError> {
    let dir = layout.providers_dir(id);
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).map_err(CatalogError::io_at(&dir))? {
        let path = entry.map_err(CatalogError::io_at(&dir))?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(provider) = DataLayout::provider_name(&path) {
            files.push((provider, path));
        }
    }
    files.sort();

    let mut providers = ProvidersApiEndpoints::new();
    for (provider, path) in files {
        let endpoints: ProviderEndpoints = read_record(&path)?;
        if endpoints.is_empty() {
            debug!(model = id, provider = %provider, "dropping provider without endpoints");
            continue;
        }
        providers.insert(provider, endpoints);
    }

    Ok((!providers.is_empty()).then_some(providers))
}

pub fn load_tweets(layout: &DataLayout, id: &str) -> Result<Option<Vec<String>>, CatalogError> {
    Ok(read_optional_record::<TweetsRecord>(&layout.tweets_path(id))?
        .map(|record| record.tweets)
        .filter(|tweets| !tweets.is_empty()))
}

/// Raw description markdown; blank files count as absent.
pub fn load_description(layout: &DataLayout, id: &str) -> Result<Option<String>, CatalogError> {
    let path = layout.description_path(id);
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path).map_err(CatalogError::io_at(&path))?;
    Ok((!content.trim().is_empty()).then_some(content))
}

/// Upcoming models (no release date) first, by name; then released models,
/// newest first.
pub fn compare_models(a: &ModelOutput, b: &ModelOutput) -> Ordering {
    match (a.core.release_date, b.core.release_date) {
        (None, None) => compare_names(&a.core.name, &b.core.name),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Read every model directory into a sorted [`Catalog`]. Any invalid record
/// aborts the scan.
pub fn scan_catalog(layout: &DataLayout) -> Result<Catalog, CatalogError> {
    let mut catalog = Catalog::default();

    for id in list_model_ids(layout)? {
        debug!(model = %id, "loading model");
        let core = load_model_core(layout, &id)?;
        let avatar_generated = has_generated_avatar(layout, &id)?;
        let providers_api_endpoints = load_providers_api_endpoints(layout, &id)?;

        if let Some(tweets) = load_tweets(layout, &id)? {
            catalog.tweets.insert(id.clone(), tweets);
        }
        if let Some(description) = load_description(layout, &id)? {
            catalog.descriptions.insert(id.clone(), description);
        }

        catalog.models.push(ModelOutput {
            core,
            providers_api_endpoints,
            avatar_generated,
        });
    }

    catalog.models.sort_by(compare_models);
    Ok(catalog)
}

fn write_file(path: &Path, content: &str) -> Result<(), CatalogError> {
    fs::write(path, content).map_err(CatalogError::io_at(path))
}

/// Write all artifacts. The descriptions directory is recreated so files
/// of removed models do not survive.
pub fn write_artifacts(catalog: &Catalog, api: &ApiLayout) -> Result<BuildSummary, CatalogError> {
    fs::create_dir_all(&api.root).map_err(CatalogError::io_at(&api.root))?;

    let models_path = api.models_path();
    write_file(&models_path, &serde_json::to_string_pretty(&catalog.models)?)?;
    info!(count = catalog.models.len(), path = %models_path.display(), "models written");

    let tweets_path = api.tweets_path();
    write_file(&tweets_path, &serde_json::to_string_pretty(&catalog.tweets)?)?;
    info!(count = catalog.tweets.len(), path = %tweets_path.display(), "tweets written");

    let descriptions_dir = api.descriptions_dir();
    if descriptions_dir.exists() {
        fs::remove_dir_all(&descriptions_dir).map_err(CatalogError::io_at(&descriptions_dir))?;
    }
    fs::create_dir_all(&descriptions_dir).map_err(CatalogError::io_at(&descriptions_dir))?;
    for (id, content) in &catalog.descriptions {
        let artifact = DescriptionArtifact {
            id: id.clone(),
            content: content.clone(),
        };
        write_file(&api.description_path(id), &serde_json::to_string(&artifact)?)?;
    }
    info!(
        count = catalog.descriptions.len(),
        path = %descriptions_dir.display(),
        "descriptions written"
    );

    Ok(BuildSummary {
        models: catalog.models.len(),
        tweets: catalog.tweets.len(),
        descriptions: catalog.descriptions.len(),
        models_path,
        tweets_path,
        descriptions_dir,
    })
}

pub fn build_api(layout: &DataLayout, api: &ApiLayout) -> Result<BuildSummary, CatalogError> {
    let catalog = scan_catalog(layout)?;
    write_artifacts(&catalog, api)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "api",
        "description": "Public JSON artifacts built from per-model markdown records",
        "artifacts": [
            { "path": crate::core::paths::MODELS_ARTIFACT, "shape": "array of model outputs" },
            { "path": crate::core::paths::TWEETS_ARTIFACT, "shape": "object: model id -> tweets" },
            { "path": format!("{}/<id>.json", crate::core::paths::DESCRIPTIONS_DIRNAME), "shape": "{ id, content }" }
        ]
    })
}
