//! Effective CLI settings
//!
//! Tally reads `tally.toml` (plus `TALLY_*` environment overrides) through
//! `tally-config`, then lets command-line flags win over both.

use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tally_config::{Config, ConfigLoader};
use tally_runtime::Assertions;

/// Load configuration from `path`, or discover `tally.toml` from the working directory.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    match path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            let cwd = env::current_dir().context("cannot determine working directory")?;
            loader
                .load_from_directory(&cwd)
                .context("failed to load tally.toml")
        }
    }
}

/// Flags given on the command line for `tally run`
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub verbose: bool,
    pub no_color: bool,
    pub json: bool,
}

/// Settings for one run after every layer has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub runner_name: String,
    pub debug: bool,
    pub show_default_message: bool,
    pub verbose: bool,
    pub color: bool,
    pub json: bool,
    pub console: bool,
}

impl Settings {
    pub fn resolve(config: &Config, flags: Overrides) -> Self {
        Self {
            runner_name: config.runner_name().to_string(),
            debug: config.debug(),
            show_default_message: config.show_default_message(),
            verbose: flags.verbose || config.verbose(),
            color: !flags.no_color && config.color(),
            json: flags.json || config.json(),
            console: config.console(),
        }
    }

    /// Assertion library configured for these settings
    pub fn assertions(&self) -> Assertions {
        Assertions::new(self.runner_name.clone())
            .with_debug(self.debug)
            .with_default_message(self.show_default_message)
    }
}
