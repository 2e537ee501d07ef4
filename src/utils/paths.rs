//! Application Paths
//!
//! Resolves `~/.assistant-hub/` and the files stored under it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the application directory (~/.assistant-hub/)
pub fn app_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".assistant-hub"))
}

/// Get the assistant-type config path (~/.assistant-hub/assistant-types.json)
pub fn registry_config_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("assistant-types.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
