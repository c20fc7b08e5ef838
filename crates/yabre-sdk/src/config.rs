//! Configuration types for Runner

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a runner gets its rules and how it runs them
///
/// Either `rules_file` (one standalone document) or `library_path` together
/// with `entry` (a rule set resolved with its dependencies) is expected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base directory of a rule library
    pub library_path: Option<PathBuf>,

    /// Name of the entry rule set in the library
    pub entry: Option<String>,

    /// Single rule-set document
    pub rules_file: Option<PathBuf>,

    /// Condition to start from instead of the graph default
    pub start_condition: Option<String>,

    /// Log decision events at info level
    pub enable_tracing: bool,
}

impl RunnerConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration file
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;

        if let Some(dir) = path.parent() {
            config.library_path = config.library_path.map(|p| resolve(dir, p));
            config.rules_file = config.rules_file.map(|p| resolve(dir, p));
        }
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| SdkError::ConfigError(format!("invalid runner config: {}", e)))
    }

    /// Use a rule library and its entry rule set
    pub fn with_library(mut self, path: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        self.library_path = Some(path.into());
        self.entry = Some(entry.into());
        self
    }

    /// Use a single rule-set document
    pub fn with_rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_file = Some(path.into());
        self
    }

    pub fn with_start_condition(mut self, condition: impl Into<String>) -> Self {
        self.start_condition = Some(condition.into());
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }

    /// Check that the rule source settings are consistent
    pub fn validate(&self) -> Result<()> {
        if self.rules_file.is_some() && self.library_path.is_some() {
            return Err(SdkError::ConfigError(
                "rules_file and library_path are mutually exclusive".to_string(),
            ));
        }
        if self.library_path.is_some() != self.entry.is_some() {
            return Err(SdkError::ConfigError(
                "library_path and entry must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builder_methods() {
        let config = RunnerConfig::new()
            .with_library("rules", "loan")
            .with_start_condition("credit")
            .enable_tracing(true);

        assert_eq!(config.library_path, Some(PathBuf::from("rules")));
        assert_eq!(config.entry.as_deref(), Some("loan"));
        assert_eq!(config.start_condition.as_deref(), Some("credit"));
        assert!(config.enable_tracing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_conflicts() {
        let both = RunnerConfig::new()
            .with_library("rules", "loan")
            .with_rules_file("loan.yaml");
        assert!(matches!(both.validate(), Err(SdkError::ConfigError(_))));

        let mut no_entry = RunnerConfig::new();
        no_entry.library_path = Some(PathBuf::from("rules"));
        assert!(no_entry.validate().is_err());
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("runner.yaml");
        fs::write(
            &path,
            "library_path: rules\nentry: loan\nenable_tracing: true\n",
        )
        .unwrap();

        let config = RunnerConfig::from_file(&path).unwrap();
        assert_eq!(config.library_path, Some(temp_dir.path().join("rules")));
        assert_eq!(config.entry.as_deref(), Some("loan"));
        assert!(config.enable_tracing);
        assert!(config.start_condition.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = RunnerConfig::from_yaml_str("enable_tracing: [").unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: invalid runner config"));
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(RunnerConfig::from_yaml_str("").unwrap(), RunnerConfig::default());
    }
}
