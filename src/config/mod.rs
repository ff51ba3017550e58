//! Configuration module
//!
//! Engine settings loaded from YAML or JSON, overridden by environment
//! variables and finally by command-line flags.

pub mod env;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;
use crate::utils::LogLevel;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./suite-runner.yaml",
    "./suite-runner.yml",
    "./.suite-runner.yaml",
    "~/.config/suite-runner/config.yaml",
    "~/.suite-runner.yaml",
];

const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Version of config file format
    pub version: String,

    /// Display name of the suite
    pub suite_name: String,

    /// Maximum number of async test bodies polled at once (unbounded if unset)
    pub max_concurrent: Option<usize>,

    /// Output format for the final summary
    pub format: String,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Colorize table output
    pub colorize: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            suite_name: "suite".to_string(),
            max_concurrent: None,
            format: "table".to_string(),
            log_level: "info".to_string(),
            colorize: true,
        }
    }
}

impl EngineConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }
        if self.suite_name.trim().is_empty() {
            anyhow::bail!("Suite name must not be empty");
        }
        if self.max_concurrent == Some(0) {
            anyhow::bail!("max_concurrent must be at least 1");
        }
        if OutputFormat::from_str(&self.format).is_none() {
            anyhow::bail!(
                "Unknown output format '{}'. Valid: table, json, json-pretty, csv, summary",
                self.format
            );
        }
        if LogLevel::from_str(&self.log_level).is_none() {
            anyhow::bail!("Unknown log level '{}'", self.log_level);
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env(&mut self, env: &env::EnvConfig) {
        if let Some(name) = &env.suite_name {
            self.suite_name = name.clone();
        }
        if let Some(max) = env.max_concurrent {
            self.max_concurrent = Some(max);
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        if let Some(no_color) = env.no_color {
            self.colorize = !no_color;
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.format).unwrap_or(OutputFormat::Table)
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Info)
    }
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

/// Expand a leading `~/` to the home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.suite_name, "suite");
        assert_eq!(config.max_concurrent, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero = EngineConfig {
            max_concurrent: Some(0),
            ..EngineConfig::default()
        };
        assert!(zero.validate().is_err());

        let format = EngineConfig {
            format: "xml".to_string(),
            ..EngineConfig::default()
        };
        assert!(format.validate().is_err());

        let version = EngineConfig {
            version: "9.9".to_string(),
            ..EngineConfig::default()
        };
        assert!(version.validate().is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("suite-runner.yaml");
        let config = EngineConfig {
            suite_name: "integration".to_string(),
            max_concurrent: Some(8),
            format: "json".to_string(),
            ..EngineConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "suite_name": "partial" }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.suite_name, "partial");
        assert_eq!(config.format, "table");
        assert!(config.colorize);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "max_concurrent: 0\n").unwrap();

        let err = EngineConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("max_concurrent"));
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = EngineConfig::default();
        let env = env::EnvConfig {
            max_concurrent: Some(2),
            no_color: Some(true),
            ..Default::default()
        };

        config.apply_env(&env);
        assert_eq!(config.max_concurrent, Some(2));
        assert!(!config.colorize);
        assert_eq!(config.format, "table");
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("./local.yaml"), PathBuf::from("./local.yaml"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/x.yaml"), home.join("x.yaml"));
        }
    }
}
