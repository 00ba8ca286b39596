//! Tally Runtime - assertion library and test engine
//!
//! This library provides:
//! - A dynamic [`Value`] model with coercive and strict equality
//! - [`Assertions`], the fixed set of assertion primitives
//! - [`TestEngine`], which runs registered tests in order and classifies them
//! - The [`ReportSink`] port through which results leave the engine
//!
//! # Example
//!
//! ```
//! use tally_runtime::{Assertions, CollectingSink, TestEngine};
//!
//! let mut engine = TestEngine::new(Assertions::new("example"));
//! engine.add("adds", |t| {
//!     t.assert_equal("sum", 2 + 2, 4)?;
//!     Ok(())
//! });
//!
//! let mut sink = CollectingSink::new();
//! let summary = engine.run_with(&mut [&mut sink]);
//! assert_eq!(summary.passed, 1);
//! ```

pub mod assert;
pub mod engine;
pub mod error;
pub mod report;
pub mod value;

pub use assert::{AssertResult, Assertions};
pub use engine::{EngineError, EngineState, RunCounters, TestEngine};
pub use error::{AssertionFailure, TestError, TestResult};
pub use report::{CollectingSink, OutcomeRecord, ReportSink, RunSummary, Status};
pub use value::{FunctionRef, NativeFn, Value, ValueArray, ValueMap};
