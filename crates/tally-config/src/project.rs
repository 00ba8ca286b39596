//! Project Configuration (tally.toml)
//!
//! Handles project-level configuration stored in `tally.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Project configuration from tally.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Assertion library and engine settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner: Option<RunnerConfig>,

    /// Reporting sink settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportConfig>,
}

/// Runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Name given to the assertion library instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Log every assertion at debug level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Prefix user messages with the built-in explanation (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_default_message: Option<bool>,
}

/// Reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// One line per test instead of progress dots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    /// Colored console output (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    /// Emit a JSON document instead of console output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Enable the console reporter (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console: Option<bool>,
}

impl ReportConfig {
    /// Overlay `other` onto `self`; set fields in `other` win.
    pub fn merge(&mut self, other: &ReportConfig) {
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.json.is_some() {
            self.json = other.json;
        }
        if other.console.is_some() {
            self.console = other.console;
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(name) = self.runner.as_ref().and_then(|r| r.name.as_deref()) {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "runner.name".to_string(),
                    reason: "name cannot be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the runner name, if present
    pub fn runner_name(&self) -> Option<&str> {
        self.runner.as_ref().and_then(|r| r.name.as_deref())
    }

    /// Mutable runner section, created on demand
    pub fn runner_mut(&mut self) -> &mut RunnerConfig {
        self.runner.get_or_insert_with(RunnerConfig::default)
    }

    /// Mutable report section, created on demand
    pub fn report_mut(&mut self) -> &mut ReportConfig {
        self.report.get_or_insert_with(ReportConfig::default)
    }
}
