//! Built-in test suites
//!
//! A suite is a named function that registers tests on an engine. The
//! [`Registrar`] it receives applies the `--filter` pattern.

pub mod demo;
pub mod selfcheck;

use tally_runtime::{Assertions, EngineError, TestEngine, TestError, Value};
use tracing::debug;

/// A named group of tests
pub struct Suite {
    pub name: &'static str,
    pub about: &'static str,
    build: fn(&mut Registrar<'_>),
}

/// Every suite the CLI knows about, in display order
pub const SUITES: &[Suite] = &[
    Suite {
        name: "selfcheck",
        about: "The assertion library checking itself (all pass)",
        build: selfcheck::register,
    },
    Suite {
        name: "demo",
        about: "Mixed outcomes: passes, failures, errors and a bad registration",
        build: demo::register,
    },
];

/// Look up a suite by name.
pub fn find(name: &str) -> Option<&'static Suite> {
    SUITES.iter().find(|suite| suite.name == name)
}

pub fn names() -> Vec<&'static str> {
    SUITES.iter().map(|suite| suite.name).collect()
}

impl Suite {
    /// Register this suite's tests on `engine`.
    ///
    /// With a filter, only tests whose label contains it are registered.
    /// Returns how many tests the filter skipped.
    pub fn install(&self, engine: &mut TestEngine, filter: Option<&str>) -> usize {
        let mut registrar = Registrar {
            engine,
            filter,
            skipped: 0,
        };
        (self.build)(&mut registrar);
        debug!(
            suite = self.name,
            registered = registrar.engine.len(),
            skipped = registrar.skipped,
            "suite installed"
        );
        registrar.skipped
    }
}

/// Filtering front for [`TestEngine`] registration
pub struct Registrar<'a> {
    engine: &'a mut TestEngine,
    filter: Option<&'a str>,
    skipped: usize,
}

impl Registrar<'_> {
    pub fn add<F>(&mut self, name: &str, body: F) -> &mut Self
    where
        F: Fn(&mut Assertions) -> Result<(), TestError> + Send + Sync + 'static,
    {
        if self.matches(name) {
            self.engine.add(name, body);
        } else {
            self.skipped += 1;
        }
        self
    }

    /// Register an arbitrary value. Non-callable values always reach the
    /// engine, which counts the rejection and hands it back here.
    pub fn register(&mut self, value: Value) -> Result<(), EngineError> {
        if let Some(func) = value.as_function() {
            if !self.matches(func.label()) {
                self.skipped += 1;
                return Ok(());
            }
        }
        self.engine.register(value)
    }

    fn matches(&self, label: &str) -> bool {
        self.filter.map_or(true, |pattern| label.contains(pattern))
    }
}
