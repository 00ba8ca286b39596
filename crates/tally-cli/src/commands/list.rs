//! List commands - show suites and the tests they register

use crate::suites::{self, SUITES};
use anyhow::{anyhow, Result};
use colored::*;
use tally_runtime::{Assertions, TestEngine};

/// Print every built-in suite with a one-line description.
pub fn suites() {
    for suite in SUITES {
        println!("{} {}", format!("{:<12}", suite.name).bold(), suite.about);
    }
}

/// Print the labels a suite registers, in registration order.
pub fn tests(name: &str, filter: Option<&str>) -> Result<()> {
    let suite = suites::find(name).ok_or_else(|| {
        anyhow!(
            "unknown suite '{}' (available: {})",
            name,
            suites::names().join(", ")
        )
    })?;

    let mut engine = TestEngine::new(Assertions::new(suite.name));
    suite.install(&mut engine, filter);

    for label in engine.list_registered() {
        println!("{}", label);
    }
    Ok(())
}
