use super::HostConfig;
use crate::error::HostError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_file: PathBuf,
    config: Arc<RwLock<HostConfig>>,
}

impl ConfigManager {
    /// Manager for `~/.rtf/config.toml`, created with defaults if missing.
    pub fn new() -> Result<Self, HostError> {
        let config_dir = Self::get_config_dir()?;
        Self::with_file(config_dir.join("config.toml"))
    }

    pub fn with_file(config_file: impl Into<PathBuf>) -> Result<Self, HostError> {
        let manager = Self {
            config_file: config_file.into(),
            config: Arc::new(RwLock::new(HostConfig::default())),
        };

        manager.ensure_config_file()?;
        manager.load_config()?;

        Ok(manager)
    }

    fn get_config_dir() -> Result<PathBuf, HostError> {
        let home = dirs::home_dir()
            .ok_or_else(|| HostError::ConfigurationError("Cannot find home directory".to_string()))?;

        let config_dir = home.join(".rtf");
        fs::create_dir_all(&config_dir).map_err(|e| {
            HostError::ConfigurationError(format!("Failed to create config directory: {}", e))
        })?;

        Ok(config_dir)
    }

    fn ensure_config_file(&self) -> Result<bool, HostError> {
        if self.config_file.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.config_file.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                HostError::ConfigurationError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(&self.config_file, HostConfig::default().to_toml_string()?).map_err(|e| {
            HostError::ConfigurationError(format!("Failed to create config file: {}", e))
        })?;
        info!("Created new config file: {:?}", self.config_file);
        Ok(true)
    }

    pub fn load_config(&self) -> Result<(), HostError> {
        let content = fs::read_to_string(&self.config_file).map_err(|e| {
            HostError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config = HostConfig::from_toml_str(&content)?;
        debug!("Loaded config from {:?}", self.config_file);

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn get_config(&self) -> HostConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn update_config(&self, config: HostConfig) -> Result<(), HostError> {
        let content = config.to_toml_string()?;
        fs::write(&self.config_file, content).map_err(|e| {
            HostError::ConfigurationError(format!("Failed to write config file: {}", e))
        })?;

        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn reload(&self) -> Result<(), HostError> {
        self.load_config()
    }
}
