//! Configuration management for the AudioSwitch agent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod paths;

/// Main configuration structure.
///
/// The config file is optional: a missing file yields defaults so the
/// agent works out of the box. A present-but-invalid file is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the config file (set after loading)
    #[serde(skip)]
    pub path: PathBuf,

    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Endpoint controller configuration
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl Config {
    /// Load configuration from the default path or environment.
    pub fn load() -> Result<Self> {
        let config_path = paths::config_file();
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let mut config = Config::default();
            config.path = path.to_path_buf();
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.path = path.to_path_buf();

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            agent: AgentConfig::default(),
            controller: ControllerConfig::default(),
        }
    }
}

/// Agent-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable Windows toast notifications for switch results and errors
    #[serde(default = "default_true")]
    pub enable_toast_notifications: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            enable_toast_notifications: default_true(),
        }
    }
}

/// Endpoint controller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Path to EndPointController.exe (optional, will auto-discover)
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.agent.log_level, "info");
        assert!(config.agent.enable_toast_notifications);
        assert!(config.controller.path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[agent]
log_level = "debug"
enable_toast_notifications = false

[controller]
path = "C:\\Tools\\EndPointController.exe"
"#
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.agent.log_level, "debug");
        assert!(!config.agent.enable_toast_notifications);
        assert_eq!(
            config.controller.path.as_deref(),
            Some(r"C:\Tools\EndPointController.exe")
        );
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
