use crate::core::schema::SchemaViolation;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("I/O error at {}: {source}", path.display())]
    IoError { path: PathBuf, source: io::Error },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error in {}: {violation}", file.display())]
    ValidationError {
        file: PathBuf,
        violation: SchemaViolation,
    },
    #[error(
        "Consistency error in {}: field `id` is '{found}' but the record lives under '{expected}'",
        file.display()
    )]
    ConsistencyError {
        file: PathBuf,
        expected: String,
        found: String,
    },
    #[error("Missing required environment variable: {0}")]
    MissingEnvironment(String),
    #[error("Configuration error in {}: {message}", file.display())]
    Config { file: PathBuf, message: String },
    #[error("Duplicate model detected: {} already exists", .0.display())]
    Duplicate(PathBuf),
}

impl CatalogError {
    /// Attach the file a violation was decoded from.
    pub fn validation(file: impl Into<PathBuf>, violation: SchemaViolation) -> Self {
        CatalogError::ValidationError {
            file: file.into(),
            violation,
        }
    }

    pub fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| CatalogError::IoError { path, source }
    }
}
