//! Registry Configuration File
//!
//! Reads and writes `assistant-types.json`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::{RegistryConfig, RegistryConfigUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{ensure_dir, registry_config_path};

/// Configuration service for the assistant-type registry
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: RegistryConfig,
}

impl ConfigService {
    /// Load `~/.assistant-hub/assistant-types.json`, creating it with defaults if missing
    pub fn new() -> AppResult<Self> {
        Self::load_or_create(registry_config_path()?)
    }

    /// Load the config at `path`, creating it with defaults if missing
    pub fn load_or_create(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        if let Some(parent) = config_path.parent() {
            ensure_dir(parent)?;
        }

        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = RegistryConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            tracing::info!(path = %config_path.display(), "created default assistant-type config");
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    fn load_from_file(path: &Path) -> AppResult<RegistryConfig> {
        let content = fs::read_to_string(path)?;
        let config: RegistryConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    fn save_to_file(path: &Path, config: &RegistryConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn get_config_clone(&self) -> RegistryConfig {
        self.config.clone()
    }

    /// Apply a partial update and persist it.
    ///
    /// An update that fails validation is rejected and leaves the file untouched.
    pub fn update_config(&mut self, update: RegistryConfigUpdate) -> AppResult<RegistryConfig> {
        let mut next = self.config.clone();
        next.apply_update(update);
        Self::save_to_file(&self.config_path, &next)?;
        self.config = next;
        Ok(self.config.clone())
    }

    pub fn reload(&mut self) -> AppResult<()> {
        self.config = Self::load_from_file(&self.config_path)?;
        Ok(())
    }

    pub fn reset(&mut self) -> AppResult<()> {
        self.config = RegistryConfig::default();
        Self::save_to_file(&self.config_path, &self.config)
    }

    pub fn is_healthy(&self) -> bool {
        self.config_path.exists() && self.config.validate().is_ok()
    }
}
