//! Shared helpers for engine integration tests

#![allow(dead_code)]

use tally_runtime::{Assertions, CollectingSink, RunSummary, TestEngine, TestError, Value};

pub use pretty_assertions::{assert_eq, assert_ne};

/// Engine with a fresh assertion library.
pub fn engine() -> TestEngine {
    TestEngine::new(Assertions::new("integration"))
}

/// Run `engine` into a collecting sink and return both.
pub fn run_collecting(engine: &mut TestEngine) -> (RunSummary, CollectingSink) {
    let mut sink = CollectingSink::new();
    let summary = engine.run_with(&mut [&mut sink]);
    (summary, sink)
}

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn arr(items: &[f64]) -> Value {
    Value::array(items.iter().copied().map(Value::Number).collect())
}

/// A callable that always raises an unexpected error.
pub fn raising(message: &'static str) -> Value {
    Value::function("raising", move |_| Err(TestError::unexpected(message)))
}
