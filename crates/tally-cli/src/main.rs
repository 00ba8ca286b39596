use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod suites;
mod testing;

/// Tally unit-testing framework.
///
/// Runs built-in suites through the tally engine and reports each test as
/// PASS, FAIL or ERROR, followed by a summary.
///
/// EXAMPLES:
///     tally suites                     List available suites
///     tally run selfcheck              Run the self-check suite
///     tally run demo --verbose         One line per test
///     tally run demo --json            Machine-readable output
///     tally list demo --filter pi      Show matching test labels
///
/// ENVIRONMENT VARIABLES:
///     TALLY_DEBUG               Set to '1' to log every assertion
///     TALLY_JSON                Set to '1' for JSON output by default
///     TALLY_NO_DEFAULT_MESSAGE  Set to '1' to drop built-in failure explanations
///     NO_COLOR                  Set to disable colored output
///     RUST_LOG                  Log filter (default: warn)
#[derive(Parser)]
#[command(name = "tally")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in suite
    ///
    /// Registers the suite's tests, runs them in order and reports the
    /// outcome of each. Exits with code 1 if any test failed or errored.
    ///
    /// EXAMPLES:
    ///     tally run selfcheck                 Run every test
    ///     tally run demo --filter pi          Only tests whose label contains "pi"
    ///     tally run demo --config ci.toml     Use a specific config file
    #[command(visible_alias = "r")]
    Run {
        /// Suite to run (see `tally suites`)
        suite: String,
        /// Only run tests whose label contains PATTERN
        #[arg(long, short = 'f', value_name = "PATTERN")]
        filter: Option<String>,
        /// Show one line per test instead of progress dots
        #[arg(long, short = 'v')]
        verbose: bool,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
        /// Output results in JSON format
        #[arg(long)]
        json: bool,
        /// Config file to use instead of discovering tally.toml
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// List the tests a suite registers
    ///
    /// EXAMPLES:
    ///     tally list demo
    ///     tally list selfcheck --filter equal
    #[command(visible_alias = "ls")]
    List {
        /// Suite to inspect
        suite: String,
        /// Only list tests whose label contains PATTERN
        #[arg(long, short = 'f', value_name = "PATTERN")]
        filter: Option<String>,
    },

    /// List available suites
    Suites,
}

/// Install the tracing subscriber. `RUST_LOG` wins over the config debug flag.
fn init_tracing(debug: bool) {
    let fallback = if debug {
        "tally_runtime=debug,tally_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            suite,
            filter,
            verbose,
            no_color,
            json,
            config: config_path,
        } => {
            let loaded = config::load(config_path.as_deref())?;
            let settings = config::Settings::resolve(
                &loaded,
                config::Overrides {
                    verbose,
                    no_color: no_color || env::var_os("NO_COLOR").is_some(),
                    json,
                },
            );
            init_tracing(settings.debug);
            commands::run::run(commands::run::RunArgs {
                suite,
                filter,
                settings,
            })?;
        }
        Commands::List { suite, filter } => {
            init_tracing(false);
            commands::list::tests(&suite, filter.as_deref())?;
        }
        Commands::Suites => {
            init_tracing(false);
            commands::list::suites();
        }
    }

    Ok(())
}
