//! sf-project: run configuration files and their validation.

pub mod schema;
pub mod validate;

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sf_sim::Physics;

pub use schema::*;
pub use validate::{ValidationError, validate_project};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported project file extension: {path}")]
    UnsupportedExtension { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml<P>(path: &Path) -> ProjectResult<Project<P>>
where
    P: Physics + DeserializeOwned,
{
    let content = std::fs::read_to_string(path)?;
    let project: Project<P> = serde_yaml::from_str(&content)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn save_yaml<P>(path: &Path, project: &Project<P>) -> ProjectResult<()>
where
    P: Physics + Serialize,
{
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json<P>(path: &Path) -> ProjectResult<Project<P>>
where
    P: Physics + DeserializeOwned,
{
    let content = std::fs::read_to_string(path)?;
    let project: Project<P> = serde_json::from_str(&content)?;
    validate_project(&project)?;
    Ok(project)
}

pub fn save_json<P>(path: &Path, project: &Project<P>) -> ProjectResult<()>
where
    P: Physics + Serialize,
{
    validate_project(project)?;
    let content = serde_json::to_string_pretty(project)?;
    std::fs::write(path, content)?;
    Ok(())
}

enum FileKind {
    Yaml,
    Json,
}

fn file_kind(path: &Path) -> ProjectResult<FileKind> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(FileKind::Yaml),
        Some("json") => Ok(FileKind::Json),
        _ => Err(ProjectError::UnsupportedExtension {
            path: path.display().to_string(),
        }),
    }
}

/// Load a YAML or JSON project, chosen by file extension.
pub fn load<P>(path: &Path) -> ProjectResult<Project<P>>
where
    P: Physics + DeserializeOwned,
{
    match file_kind(path)? {
        FileKind::Yaml => load_yaml(path),
        FileKind::Json => load_json(path),
    }
}

/// Save a YAML or JSON project, chosen by file extension.
pub fn save<P>(path: &Path, project: &Project<P>) -> ProjectResult<()>
where
    P: Physics + Serialize,
{
    match file_kind(path)? {
        FileKind::Yaml => save_yaml(path, project),
        FileKind::Json => save_json(path, project),
    }
}
