//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::global::GlobalConfig;
use crate::project::{ProjectConfig, ReportConfig};
use crate::{ConfigError, ConfigResult, CONFIG_FILE};
use std::env;
use std::path::{Path, PathBuf};

/// Default name of the assertion library instance
pub const DEFAULT_RUNNER_NAME: &str = "tally";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.tally/config.toml) - lowest priority
/// 2. Project config (./tally.toml) - overrides global
/// 3. Environment variables (TALLY_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration, with environment overrides applied
    pub project: ProjectConfig,

    /// Global configuration
    pub global: GlobalConfig,

    /// Project root directory (where tally.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use `path` instead of ~/.tally/config.toml for the global layer
    pub fn with_global_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find tally.toml, then loads and merges
    /// global config if it exists.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    /// Find project configuration by walking up directory tree
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Load global configuration; a missing file or home directory yields defaults
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        if self.global_config_path.is_none() {
            match GlobalConfig::global_config_path() {
                Ok(path) => self.global_config_path = Some(path),
                Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                Err(e) => return Err(e),
            }
        }

        match self.global_config_path.as_deref() {
            Some(path) if path.exists() => GlobalConfig::load_from_file(path),
            _ => Ok(GlobalConfig::default()),
        }
    }

    /// Apply environment variable overrides to project config
    ///
    /// Recognised: TALLY_DEBUG, TALLY_JSON, TALLY_NO_DEFAULT_MESSAGE
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Some(debug) = env_flag("TALLY_DEBUG")? {
            config.runner_mut().debug = Some(debug);
        }

        if let Some(json) = env_flag("TALLY_JSON")? {
            config.report_mut().json = Some(json);
        }

        if let Some(hide) = env_flag("TALLY_NO_DEFAULT_MESSAGE")? {
            config.runner_mut().show_default_message = Some(!hide);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a boolean environment variable. Unset means `None`.
fn env_flag(name: &str) -> ConfigResult<Option<bool>> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" | "" => Ok(Some(false)),
        other => Err(ConfigError::InvalidValue {
            field: name.to_string(),
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

impl Config {
    /// Effective report settings (global < project)
    pub fn report(&self) -> ReportConfig {
        let mut report = self.global.report.clone().unwrap_or_default();
        if let Some(project) = &self.project.report {
            report.merge(project);
        }
        report
    }

    /// Name of the assertion library instance
    pub fn runner_name(&self) -> &str {
        self.project.runner_name().unwrap_or(DEFAULT_RUNNER_NAME)
    }

    pub fn debug(&self) -> bool {
        self.project
            .runner
            .as_ref()
            .and_then(|r| r.debug)
            .unwrap_or(false)
    }

    pub fn show_default_message(&self) -> bool {
        self.project
            .runner
            .as_ref()
            .and_then(|r| r.show_default_message)
            .unwrap_or(true)
    }

    pub fn verbose(&self) -> bool {
        self.report().verbose.unwrap_or(false)
    }

    pub fn color(&self) -> bool {
        self.report().color.unwrap_or(true)
    }

    pub fn json(&self) -> bool {
        self.report().json.unwrap_or(false)
    }

    pub fn console(&self) -> bool {
        self.report().console.unwrap_or(true)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a tally.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::new().with_global_path(dir.path().join("no-global.toml"))
    }

    #[test]
    #[serial]
    fn test_defaults_without_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = loader(&temp_dir)
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert!(!config.is_project());
        assert_eq!(config.runner_name(), DEFAULT_RUNNER_NAME);
        assert!(config.show_default_message());
        assert!(config.console());
        assert!(config.color());
    }

    #[test]
    #[serial]
    fn test_env_override_debug() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[runner]
debug = false
"#,
        );

        env::set_var("TALLY_DEBUG", "yes");
        let config = loader(&temp_dir).load_from_directory(temp_dir.path());
        env::remove_var("TALLY_DEBUG");

        assert!(config.unwrap().debug());
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("TALLY_JSON", "maybe");
        let result = loader(&temp_dir).load_from_directory(temp_dir.path());
        env::remove_var("TALLY_JSON");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    #[serial]
    fn test_env_hides_default_message() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("TALLY_NO_DEFAULT_MESSAGE", "1");
        let config = loader(&temp_dir).load_from_directory(temp_dir.path());
        env::remove_var("TALLY_NO_DEFAULT_MESSAGE");

        assert!(!config.unwrap().show_default_message());
    }

    #[test]
    #[serial]
    fn test_global_report_defaults_are_overridden_by_project() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        fs::write(
            &global,
            r#"
[report]
color = false
verbose = true
"#,
        )
        .unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[report]
verbose = false
"#,
        );

        let config = ConfigLoader::new()
            .with_global_path(&global)
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert!(!config.color());
        assert!(!config.verbose());
    }
}
