//! Outcome records and the reporting sink port
//!
//! The engine emits one [`OutcomeRecord`] per executed test and one
//! [`RunSummary`] per run. Anything implementing [`ReportSink`] can consume
//! them; the engine never looks at what a sink does with the data.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Classification of one executed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Completed without raising
    Pass,
    /// Raised an assertion failure
    Fail,
    /// Raised anything else, or panicked
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running a single test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRecord {
    /// Label derived from the registered function's name
    pub label: String,
    pub status: Status,
    /// Empty for passing tests; the failure or error message otherwise
    pub detail: String,
    /// Diagnostic trace for errors, when one is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    /// Assertions evaluated by this test
    pub assertions: usize,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl OutcomeRecord {
    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }
}

/// Totals for a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    /// Always `passed + failed + errors`
    pub total: usize,
    /// Assertions evaluated across the run
    pub assertions: usize,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

impl RunSummary {
    /// True when nothing failed or errored.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Consumer of engine output.
///
/// Called synchronously: `on_outcome` once per test in execution order, then
/// `on_summary` once at the end of the run.
pub trait ReportSink {
    fn on_outcome(&mut self, record: &OutcomeRecord);

    fn on_summary(&mut self, summary: &RunSummary);
}

/// Sink that keeps everything it receives. Useful for assertions on a run.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub outcomes: Vec<OutcomeRecord>,
    pub summaries: Vec<RunSummary>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.label.as_str()).collect()
    }

    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.summaries.last()
    }
}

impl ReportSink for CollectingSink {
    fn on_outcome(&mut self, record: &OutcomeRecord) {
        self.outcomes.push(record.clone());
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        self.summaries.push(*summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn test_summary_success() {
        let mut summary = RunSummary::default();
        assert!(summary.is_success());
        summary.errors = 1;
        assert!(!summary.is_success());
    }

    #[test]
    fn test_outcome_record_json_shape() {
        let record = OutcomeRecord {
            label: "adds".to_string(),
            status: Status::Pass,
            detail: String::new(),
            trace: None,
            assertions: 2,
            duration: Duration::from_millis(3),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pass");
        assert_eq!(json["duration_ms"], 3);
        assert!(json.get("trace").is_none());
    }
}
