use std::{fs, path::Path, str::FromStr};

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::{rendering::RenderConfig, window::WindowConfig};
use crate::utils::error::ConfigError;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV_VAR: &str = "TRICHROME_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub window: WindowConfig,
    pub rendering: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            rendering: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the file named by `TRICHROME_CONFIG`, or falls back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.log_level_filter()?;
        Ok(config)
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}
