//! New-model intake from an issue-form body.

use crate::core::error::CatalogError;
use crate::core::markdown;
use crate::core::paths::DataLayout;
use crate::core::records::{ModelCore, model_id};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ISSUE_BODY_ENV: &str = "ISSUE_BODY";
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedModel {
    pub model: ModelCore,
    pub core_path: PathBuf,
}

/// Validate `body` as a core record and store its canonical encoding.
///
/// `source` names where the body came from in validation errors. An
/// existing core record for the same id is never overwritten.
pub fn add_model(
    layout: &DataLayout,
    body: &str,
    source: &Path,
) -> Result<AddedModel, CatalogError> {
    let model: ModelCore =
        markdown::decode(body).map_err(|v| CatalogError::validation(source, v))?;

    let derived = model_id(&model.creator, &model.name);
    if derived != model.id {
        warn!(id = %model.id, derived = %derived, "model id differs from creator/name slug");
    }

    let core_path = layout.core_path(&model.id);
    if core_path.exists() {
        return Err(CatalogError::Duplicate(core_path));
    }

    let model_dir = layout.model_dir(&model.id);
    fs::create_dir_all(&model_dir).map_err(CatalogError::io_at(&model_dir))?;
    fs::write(&core_path, markdown::encode(&model)?).map_err(CatalogError::io_at(&core_path))?;
    info!(id = %model.id, path = %core_path.display(), "model added");

    Ok(AddedModel { model, core_path })
}

/// Step outputs for the workflow that opens the pull request.
pub fn workflow_outputs(model: &ModelCore) -> Vec<(&'static str, String)> {
    vec![
        ("branch-name", format!("add-model/{}", model.id)),
        ("model-id", model.id.clone()),
        ("model-name", model.name.clone()),
    ]
}

/// Append `key=value` lines to a GitHub Actions output file.
pub fn append_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<(), CatalogError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(CatalogError::io_at(path))?;
    let mut rendered = outputs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n");
    rendered.push('\n');
    file.write_all(rendered.as_bytes())
        .map_err(CatalogError::io_at(path))
}
