//! Tally Configuration System
//!
//! Provides configuration for test runs:
//! - Project configuration (tally.toml)
//! - Global user configuration (~/.tally/config.toml)
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.tally/config.toml)
//! 2. Project config (./tally.toml)
//! 3. Environment variables (TALLY_*)
//! 4. CLI flags
//!
//! # Example
//!
//! ```no_run
//! use tally_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("debug logging: {}", config.debug());
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{ProjectConfig, ReportConfig, RunnerConfig};

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "tally.toml";
