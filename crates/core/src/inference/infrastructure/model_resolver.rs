use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{AGE_MODEL_NAME, APP_DIR_NAME, FACE_MODEL_NAME, GENDER_MODEL_NAME};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("models directory does not exist: {0}")]
    MissingDir(PathBuf),
    #[error("model {name} not found in any of: {searched}")]
    NotFound { name: String, searched: String },
}

/// Resolved locations of the three model files.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelPaths {
    pub face: PathBuf,
    pub age: PathBuf,
    pub gender: PathBuf,
}

/// Resolve all three models, failing on the first one that is missing.
pub fn resolve_all(models_dir: Option<&Path>) -> Result<ModelPaths, ModelResolveError> {
    let dirs = search_dirs(models_dir)?;
    Ok(ModelPaths {
        face: resolve_in(FACE_MODEL_NAME, &dirs)?,
        age: resolve_in(AGE_MODEL_NAME, &dirs)?,
        gender: resolve_in(GENDER_MODEL_NAME, &dirs)?,
    })
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. Explicit models directory (when given; it must exist)
/// 2. Current working directory
/// 3. User cache directory (platform-specific)
pub fn resolve(name: &str, models_dir: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    let dirs = search_dirs(models_dir)?;
    resolve_in(name, &dirs)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Face Insight/models/`
/// - Linux: `$XDG_CACHE_HOME/Face Insight/models/` or `~/.cache/Face Insight/models/`
/// - Windows: `%LOCALAPPDATA%/Face Insight/models/`
pub fn model_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir().map(|d| d.join(APP_DIR_NAME).join("models"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir().map(|d| d.join(APP_DIR_NAME).join("models"))
    }
}

fn search_dirs(models_dir: Option<&Path>) -> Result<Vec<PathBuf>, ModelResolveError> {
    let mut dirs = Vec::with_capacity(3);
    if let Some(dir) = models_dir {
        if !dir.is_dir() {
            return Err(ModelResolveError::MissingDir(dir.to_path_buf()));
        }
        dirs.push(dir.to_path_buf());
    }
    dirs.push(PathBuf::from("."));
    if let Some(cache) = model_cache_dir() {
        dirs.push(cache);
    }
    Ok(dirs)
}

fn resolve_in(name: &str, dirs: &[PathBuf]) -> Result<PathBuf, ModelResolveError> {
    for dir in dirs {
        let candidate = dir.join(name);
        if candidate.is_file() {
            log::debug!("Resolved {name} -> {}", candidate.display());
            return Ok(candidate);
        }
    }
    Err(ModelResolveError::NotFound {
        name: name.to_string(),
        searched: dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}
