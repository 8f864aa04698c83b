use crate::error::HostError;
use crate::hosting::{normalize_path, DEFAULT_HUB_PATH, DEFAULT_MAX_BODY_BYTES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub host: String,
    pub port: u16,
    pub hub_path: String,
    pub log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8900,
            hub_path: DEFAULT_HUB_PATH.to_string(),
            log_level: "info".to_string(),
            log_file: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl HostConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, HostError> {
        let config: HostConfig = toml::from_str(content)
            .map_err(|e| HostError::ConfigurationError(format!("Failed to parse config: {}", e)))?;
        config.validated()
    }

    pub fn to_toml_string(&self) -> Result<String, HostError> {
        toml::to_string_pretty(self)
            .map_err(|e| HostError::ConfigurationError(format!("Failed to serialize config: {}", e)))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_hub_path(mut self, path: &str) -> Self {
        self.hub_path = normalize_path(path);
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validated(mut self) -> Result<Self, HostError> {
        if self.max_body_bytes == 0 {
            return Err(HostError::ConfigurationError(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        self.hub_path = normalize_path(&self.hub_path);
        Ok(self)
    }
}
