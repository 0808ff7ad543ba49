use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the robot name.
pub const ROBOT_NAME_ENV: &str = "RESPOND_ROBOT_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// Identity of the robot the plugin runs inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Name users address the robot by (`@hubot ...`).
    #[serde(default = "default_robot_name")]
    pub name: String,
    /// Optional second name the robot answers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

fn default_robot_name() -> String {
    "hubot".to_string()
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            name: default_robot_name(),
            alias: None,
        }
    }
}

/// Which key-value store backs the brain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrainBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Brain (persistence) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainConfig {
    #[serde(default)]
    pub backend: BrainBackend,
    /// SQLite file; defaults to `~/.respond/brain.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Brain key the trigger map is stored under.
    #[serde(default = "default_brain_key")]
    pub key: String,
}

fn default_brain_key() -> String {
    "respond".to_string()
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            backend: BrainBackend::default(),
            path: None,
            key: default_brain_key(),
        }
    }
}

impl BrainConfig {
    /// Resolve the SQLite path, falling back to the config directory.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.path {
            Some(p) => Ok(p.clone()),
            None => Ok(config_dir()?.join("brain.db")),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RespondConfig {
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub brain: BrainConfig,
}

impl RespondConfig {
    /// Replace the robot name when an override is present and non-empty.
    pub fn with_robot_name_override(mut self, name: Option<String>) -> Self {
        if let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            tracing::debug!("Robot name overridden to {name}");
            self.robot.name = name;
        }
        self
    }
}

/// Resolve the config directory (~/.respond/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".respond"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.respond/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from the default path, falling back to defaults.
pub fn load_config() -> Result<RespondConfig, ConfigError> {
    let path = config_file_path()?;
    load_config_from(&path)
}

/// Load configuration from a specific path, falling back to defaults if not found.
///
/// Loads `.env` first so that `RESPOND_ROBOT_NAME` can come from it.
pub fn load_config_from(path: &Path) -> Result<RespondConfig, ConfigError> {
    let _ = dotenvy::dotenv();

    let config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        json5::from_str::<RespondConfig>(&content)?
    } else {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        RespondConfig::default()
    };

    Ok(config.with_robot_name_override(std::env::var(ROBOT_NAME_ENV).ok()))
}
