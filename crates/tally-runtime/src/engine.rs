//! Test engine - register and execute test functions
//!
//! Tests run one at a time in registration order. Each body receives the
//! engine's [`Assertions`] instance and is invoked inside a protected region:
//! an assertion failure marks the test failed, any other error or a panic
//! marks it errored, and the next test runs regardless.

use crate::assert::Assertions;
use crate::error::{panic_message, TestError};
use crate::report::{OutcomeRecord, ReportSink, RunSummary, Status};
use crate::value::{FunctionRef, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Errors surfaced to the caller of the engine (never test outcomes).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot register {type_name} as a test: value is not callable")]
    NotCallable { type_name: &'static str },
}

/// Lifecycle of the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    Registering,
    Running,
    Reporting,
}

/// Counters for the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    /// Rejected `register` calls since the last `reset`. Kept apart from
    /// `errors` so a run never counts them as test outcomes.
    pub registration_errors: usize,
}

impl RunCounters {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }

    fn clear_run(&mut self) {
        self.passed = 0;
        self.failed = 0;
        self.errors = 0;
    }
}

/// Sequential test engine
#[derive(Debug, Default)]
pub struct TestEngine {
    registry: Vec<FunctionRef>,
    asserts: Assertions,
    counters: RunCounters,
    state: EngineState,
}

impl TestEngine {
    /// Create an engine that hands `asserts` to every test.
    pub fn new(asserts: Assertions) -> Self {
        Self {
            registry: Vec::new(),
            asserts,
            counters: RunCounters::default(),
            state: EngineState::Idle,
        }
    }

    /// Register a callable value. Duplicates are allowed and run twice.
    ///
    /// Non-callable values are rejected immediately and recorded in
    /// [`RunCounters::registration_errors`].
    pub fn register(&mut self, value: Value) -> Result<(), EngineError> {
        match value {
            Value::Function(func) => {
                self.push(func);
                Ok(())
            }
            other => {
                self.counters.registration_errors += 1;
                let err = EngineError::NotCallable {
                    type_name: other.type_name(),
                };
                warn!(error = %err, "rejected test registration");
                Err(err)
            }
        }
    }

    /// Register a closure under `name`.
    pub fn add<F>(&mut self, name: &str, body: F) -> &mut Self
    where
        F: Fn(&mut Assertions) -> Result<(), TestError> + Send + Sync + 'static,
    {
        self.push(FunctionRef {
            name: Arc::from(name),
            body: Arc::new(move |asserts: &mut Assertions| {
                body(asserts).map(|()| Value::Undefined)
            }),
        });
        self
    }

    fn push(&mut self, func: FunctionRef) {
        trace!(label = func.label(), "registered test");
        self.registry.push(func);
        self.state = EngineState::Registering;
    }

    /// Zero every counter and empty the registry.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.counters = RunCounters::default();
        self.asserts.reset_count();
        self.state = EngineState::Idle;
    }

    /// Labels of the registered tests in registration order.
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted.
    pub fn list_registered(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.registry.iter().map(FunctionRef::label)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn assertions(&self) -> &Assertions {
        &self.asserts
    }

    /// Run every registered test without reporting sinks.
    pub fn run(&mut self) -> RunSummary {
        self.run_with(&mut [])
    }

    /// Run every registered test and report to `sinks`.
    ///
    /// Always completes and always emits a summary, whatever the tests do.
    pub fn run_with(&mut self, sinks: &mut [&mut dyn ReportSink]) -> RunSummary {
        self.state = EngineState::Running;
        self.counters.clear_run();
        self.asserts.reset_count();
        debug!(tests = self.registry.len(), suite = self.asserts.name(), "starting run");

        let started = Instant::now();
        for index in 0..self.registry.len() {
            let func = self.registry[index].clone();
            let record = self.run_single_test(&func);
            match record.status {
                Status::Pass => self.counters.passed += 1,
                Status::Fail => self.counters.failed += 1,
                Status::Error => self.counters.errors += 1,
            }
            for sink in sinks.iter_mut() {
                sink.on_outcome(&record);
            }
        }

        self.state = EngineState::Reporting;
        let summary = RunSummary {
            passed: self.counters.passed,
            failed: self.counters.failed,
            errors: self.counters.errors,
            total: self.counters.total(),
            assertions: self.asserts.count(),
            duration: started.elapsed(),
        };
        info!(
            passed = summary.passed,
            failed = summary.failed,
            errors = summary.errors,
            assertions = summary.assertions,
            "run finished"
        );
        for sink in sinks.iter_mut() {
            sink.on_summary(&summary);
        }

        self.state = EngineState::Idle;
        summary
    }

    /// Run a single test inside a protected region and classify it.
    fn run_single_test(&mut self, func: &FunctionRef) -> OutcomeRecord {
        let label = func.label().to_string();
        let before = self.asserts.count();
        let start = Instant::now();
        debug!(test = %label, "running test");

        let asserts = &mut self.asserts;
        asserts.clear_pending_code();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| func.call(asserts)));

        let (status, detail, trace) = match outcome {
            Ok(Ok(_)) => (Status::Pass, String::new(), None),
            Ok(Err(TestError::Assertion(failure))) => (Status::Fail, failure.to_string(), None),
            Ok(Err(TestError::Unexpected { message, trace })) => (Status::Error, message, trace),
            Err(payload) => (
                Status::Error,
                format!("test panicked: {}", panic_message(payload.as_ref())),
                None,
            ),
        };
        debug!(test = %label, status = %status, "test finished");

        OutcomeRecord {
            label,
            status,
            detail,
            trace,
            assertions: self.asserts.count() - before,
            duration: start.elapsed(),
        }
    }
}
