//! JSON reporter - one machine-readable document per run

use serde_json::{json, Value as Json};
use tally_runtime::{OutcomeRecord, ReportSink, RunSummary};

/// Collects outcomes and builds a JSON document once the summary arrives.
pub struct JsonReporter {
    suite: String,
    registration_errors: usize,
    results: Vec<Json>,
    document: Option<Json>,
}

impl JsonReporter {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            registration_errors: 0,
            results: Vec::new(),
            document: None,
        }
    }

    /// Record rejected registrations alongside the run totals.
    pub fn with_registration_errors(mut self, count: usize) -> Self {
        self.registration_errors = count;
        self
    }

    /// The finished document, available after `on_summary`.
    pub fn document(&self) -> Option<&Json> {
        self.document.as_ref()
    }
}

impl ReportSink for JsonReporter {
    fn on_outcome(&mut self, record: &OutcomeRecord) {
        self.results.push(json!({
            "label": record.label,
            "status": record.status,
            "detail": record.detail,
            "trace": record.trace,
            "assertions": record.assertions,
            "duration_ms": record.duration.as_millis() as u64,
        }));
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        self.document = Some(json!({
            "suite": self.suite,
            "tests": summary.total,
            "passed": summary.passed,
            "failed": summary.failed,
            "errors": summary.errors,
            "registration_errors": self.registration_errors,
            "assertions": summary.assertions,
            "duration_ms": summary.duration.as_millis() as u64,
            "success": summary.is_success(),
            "results": std::mem::take(&mut self.results),
        }));
    }
}
