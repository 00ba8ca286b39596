//! Run command - execute a built-in suite

use crate::config::Settings;
use crate::suites;
use crate::testing::{ConsoleReporter, JsonReporter};
use anyhow::{anyhow, Result};
use colored::*;
use tally_runtime::{ReportSink, TestEngine};
use tracing::info;

/// Arguments for the run command
pub struct RunArgs {
    /// Suite name
    pub suite: String,
    /// Only run tests whose label contains this pattern
    pub filter: Option<String>,
    pub settings: Settings,
}

/// Run the run command
pub fn run(args: RunArgs) -> Result<()> {
    let suite = suites::find(&args.suite).ok_or_else(|| {
        anyhow!(
            "unknown suite '{}' (available: {})",
            args.suite,
            suites::names().join(", ")
        )
    })?;
    let settings = &args.settings;

    if !settings.color {
        colored::control::set_override(false);
    }

    let mut engine = TestEngine::new(settings.assertions());
    let skipped = suite.install(&mut engine, args.filter.as_deref());
    let rejected = engine.counters().registration_errors;
    let show_console = !settings.json && settings.console;

    if show_console {
        if engine.is_empty() {
            println!("{}", "No tests found.".yellow());
        } else {
            println!(
                "Running {} test{} from {}",
                engine.len().to_string().bold(),
                if engine.len() == 1 { "" } else { "s" },
                suite.name.bold()
            );
        }
        if skipped > 0 {
            println!("{} filtered out", skipped);
        }
        println!();
    }

    let mut console = ConsoleReporter::new(settings.verbose);
    let mut json = JsonReporter::new(suite.name).with_registration_errors(rejected);
    let summary = {
        let mut sinks: Vec<&mut dyn ReportSink> = Vec::new();
        if settings.json {
            sinks.push(&mut json);
        } else if settings.console {
            sinks.push(&mut console);
        }
        engine.run_with(&mut sinks)
    };
    info!(suite = suite.name, total = summary.total, "suite finished");

    if let Some(document) = json.document() {
        println!("{}", document);
    }

    if rejected > 0 && show_console {
        eprintln!(
            "{} {} value{} could not be registered as a test",
            "warning:".yellow().bold(),
            rejected,
            if rejected == 1 { "" } else { "s" }
        );
    }

    if !settings.color {
        colored::control::unset_override();
    }

    // Exit with code 1 if anything failed, errored or could not be registered
    if !summary.is_success() || rejected > 0 {
        std::process::exit(1);
    }

    Ok(())
}
