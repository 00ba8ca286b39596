//! Engine integration tests
//!
//! Covers registration, ordering, outcome classification, isolation between
//! tests, reset semantics and sink emission.

mod common;

use common::*;
use common::assert_eq;
use std::sync::{Arc, Mutex};
use tally_runtime::{
    Assertions, CollectingSink, EngineError, OutcomeRecord, ReportSink, RunSummary, Status,
    TestEngine, TestError, Value,
};

// ============================================================================
// Classification and isolation
// ============================================================================

#[test]
fn test_pass_fail_error_are_counted_separately() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut engine = engine();

    let seen = Arc::clone(&order);
    engine.add("a_passes", move |t| {
        seen.lock().unwrap().push("a");
        t.assert_equal("", 5, 5)?;
        Ok(())
    });
    let seen = Arc::clone(&order);
    engine.add("b_fails", move |t| {
        seen.lock().unwrap().push("b");
        t.assert_equal("", 5, 1)?;
        Ok(())
    });
    let seen = Arc::clone(&order);
    engine.add("c_errors", move |_| {
        seen.lock().unwrap().push("c");
        Err(TestError::unexpected("plain error"))
    });

    let (summary, sink) = run_collecting(&mut engine);

    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.total, 3);
    assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(sink.labels(), vec!["a_passes", "b_fails", "c_errors"]);
}

#[test]
fn test_outcome_details() {
    let mut engine = engine();
    engine
        .add("passes", |_| Ok(()))
        .add("fails", |t| {
            t.at("F1").assert_equal("numbers", 5, 1)?;
            Ok(())
        })
        .add("errors", |_| {
            Err(TestError::Unexpected {
                message: "disk on fire".to_string(),
                trace: Some("at write()".to_string()),
            })
        });

    let (_, sink) = run_collecting(&mut engine);
    let [pass, fail, error] = &sink.outcomes[..] else {
        panic!("expected three outcomes, got {}", sink.outcomes.len());
    };

    assert_eq!(pass.status, Status::Pass);
    assert_eq!(pass.detail, "");

    assert_eq!(fail.status, Status::Fail);
    assert_eq!(fail.detail, "[Equal#F1] Expected 1 but was 5: numbers");

    assert_eq!(error.status, Status::Error);
    assert_eq!(error.detail, "disk on fire");
    assert_eq!(error.trace.as_deref(), Some("at write()"));
}

#[test]
fn test_failure_stops_only_the_failing_test() {
    let mut engine = engine();
    engine.add("stops_early", |t| {
        t.fail("first")?;
        t.fail("never evaluated")?;
        Ok(())
    });
    engine.add("still_runs", |t| {
        t.assert_true("", true)?;
        Ok(())
    });

    let (summary, sink) = run_collecting(&mut engine);
    assert_eq!(summary.assertions, 2);
    assert_eq!(sink.outcomes[0].assertions, 1);
    assert!(sink.outcomes[1].is_pass());
}

#[test]
fn test_panic_does_not_abort_run() {
    let mut engine = engine();
    engine
        .add("panics", |_| {
            let fixture: Option<u8> = None;
            fixture.expect("fixture missing");
            Ok(())
        })
        .add("after_panic", |_| Ok(()));

    let (summary, sink) = run_collecting(&mut engine);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.passed, 1);
    assert!(sink.outcomes[0].detail.starts_with("test panicked:"));
}

#[test]
fn test_assertion_failure_caught_by_assert_throw_is_a_pass() {
    let mut engine = engine();
    engine.add("expects_throw", |t| {
        let caught = t.assert_throw("", &raising("boom"))?;
        t.assert_str_contains("", caught.to_string(), "boom")?;
        Ok(())
    });

    let (summary, _) = run_collecting(&mut engine);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.assertions, 2);
}

#[test]
fn test_panic_inside_assert_throw_is_a_pass() {
    let mut engine = engine();
    engine.add("expects_panic", |t| {
        let panicking = Value::function("boom", |_| panic!("raised by panic"));
        let caught = t.assert_throw("", &panicking)?;
        t.assert_str_contains("", caught.to_string(), "raised by panic")?;
        Ok(())
    });

    let (summary, sink) = run_collecting(&mut engine);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.errors, 0);
    assert!(sink.outcomes[0].is_pass());
}

#[test]
fn test_unused_site_code_does_not_reach_next_test() {
    let mut engine = engine();
    engine
        .add("tags_then_returns", |t| {
            t.at("LEAK");
            Ok(())
        })
        .add("fails_untagged", |t| {
            t.assert_equal("", 1, 2)?;
            Ok(())
        });

    let (summary, sink) = run_collecting(&mut engine);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(sink.outcomes[1].detail, "[Equal] Expected 2 but was 1");
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_non_callable_is_synchronous_error() {
    let mut engine = engine();
    let err = engine.register(Value::string("not a test")).unwrap_err();

    assert_eq!(err, EngineError::NotCallable { type_name: "string" });
    assert_eq!(engine.counters().registration_errors, 1);
    assert_eq!(engine.counters().passed, 0);
    assert_eq!(engine.counters().failed, 0);
    assert!(engine.is_empty());

    let summary = engine.run();
    assert_eq!(summary.total, 0);
    assert_eq!(engine.counters().registration_errors, 1);
}

#[test]
fn test_register_callable_values() {
    let mut engine = engine();
    let check = Value::function("checks_value", |t| {
        t.assert_not_null("", 1)?;
        Ok(Value::Undefined)
    });
    engine.register(check.clone()).unwrap();
    engine.register(check).unwrap();
    engine
        .register(Value::function("", |_| Ok(Value::Null)))
        .unwrap();

    let labels: Vec<_> = engine.list_registered().collect();
    assert_eq!(labels, vec!["checks_value", "checks_value", "<anonymous>"]);

    let summary = engine.run();
    assert_eq!(summary.passed, 3);
    assert_eq!(summary.assertions, 2);
}

#[test]
fn test_list_registered_is_restartable() {
    let mut engine = engine();
    engine.add("one", |_| Ok(())).add("two", |_| Ok(()));

    let labels = engine.list_registered();
    let first: Vec<_> = labels.clone().collect();
    let second: Vec<_> = labels.collect();
    assert_eq!(first, second);
    assert_eq!(engine.list_registered().count(), 2);
}

// ============================================================================
// Reset and reuse
// ============================================================================

#[test]
fn test_reset_then_run_emits_zero_summary() {
    let mut engine = engine();
    engine.add("fails", |t| {
        t.fail("")?;
        Ok(())
    });
    let _ = engine.register(Value::Null);
    engine.run();

    engine.reset();
    let (summary, sink) = run_collecting(&mut engine);

    assert_eq!(summary, RunSummary { duration: summary.duration, ..RunSummary::default() });
    assert!(sink.outcomes.is_empty());
    assert_eq!(sink.summaries.len(), 1);
    assert_eq!(engine.counters().registration_errors, 0);
}

#[test]
fn test_rerun_without_reset_reruns_registry() {
    let mut engine = engine();
    engine.add("once", |t| {
        t.assert_true("", 1)?;
        Ok(())
    });

    let first = engine.run();
    let second = engine.run();
    assert_eq!(first.passed, 1);
    assert_eq!(second.passed, 1);
    assert_eq!(second.assertions, 1);
}

// ============================================================================
// Sinks
// ============================================================================

#[derive(Default)]
struct EventLog(Vec<String>);

impl ReportSink for EventLog {
    fn on_outcome(&mut self, record: &OutcomeRecord) {
        self.0.push(format!("{} {}", record.status, record.label));
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        self.0.push(format!(
            "summary {}/{}/{} of {} ({} checks)",
            summary.passed, summary.failed, summary.errors, summary.total, summary.assertions
        ));
    }
}

#[test]
fn test_every_sink_receives_outcomes_then_summary() {
    let mut engine = TestEngine::new(Assertions::new("sinks").with_debug(true));
    engine
        .add("ok", |t| {
            t.assert_equal("", "1", 1)?;
            Ok(())
        })
        .add("bad", |t| {
            t.assert_type_equal("", "1", 1)?;
            Ok(())
        });

    let mut log = EventLog::default();
    let mut collected = CollectingSink::new();
    engine.run_with(&mut [&mut log, &mut collected]);

    assert_eq!(
        log.0,
        vec![
            "PASS ok".to_string(),
            "FAIL bad".to_string(),
            "summary 1/1/0 of 2 (2 checks)".to_string(),
        ]
    );
    assert_eq!(collected.outcomes.len(), 2);
    assert_eq!(collected.last_summary().map(|s| s.failed), Some(1));
}
