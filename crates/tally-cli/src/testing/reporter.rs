//! Console reporter - display test results as they arrive

use colored::*;
use std::io::{self, Write};
use tally_runtime::{OutcomeRecord, ReportSink, RunSummary, Status};

/// Console reporting sink
///
/// Prints a progress mark (or a full line when verbose) per test, then the
/// summary and the details of every failure or error.
pub struct ConsoleReporter {
    /// Show one line per test instead of dots
    verbose: bool,
    /// Tests reported so far in this run
    seen: usize,
    /// Non-passing outcomes kept for the details section
    problems: Vec<OutcomeRecord>,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            seen: 0,
            problems: Vec::new(),
        }
    }
}

impl ReportSink for ConsoleReporter {
    fn on_outcome(&mut self, record: &OutcomeRecord) {
        if self.verbose {
            println!("{}", outcome_line(record));
        } else {
            print!("{}", progress_mark(record.status));
            let _ = io::stdout().flush();
        }

        self.seen += 1;
        if !record.is_pass() {
            self.problems.push(record.clone());
        }
    }

    fn on_summary(&mut self, summary: &RunSummary) {
        // Dots need a newline
        if !self.verbose && self.seen > 0 {
            println!();
        }
        println!();
        print!("{}", summary_text(summary));
        print!("{}", problems_text(&self.problems));

        self.seen = 0;
        self.problems.clear();
    }
}

fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Pass => status.as_str().green().bold(),
        Status::Fail => status.as_str().red().bold(),
        Status::Error => status.as_str().yellow().bold(),
    }
}

/// Single-character progress mark
pub fn progress_mark(status: Status) -> ColoredString {
    match status {
        Status::Pass => ".".green(),
        Status::Fail => "F".red().bold(),
        Status::Error => "E".yellow().bold(),
    }
}

/// Verbose line for one test
pub fn outcome_line(record: &OutcomeRecord) -> String {
    format!(
        "{} {} ({} assertion{}, {:.2?})",
        status_label(record.status),
        record.label,
        record.assertions,
        if record.assertions == 1 { "" } else { "s" },
        record.duration
    )
}

pub fn summary_text(summary: &RunSummary) -> String {
    let status = if summary.is_success() {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };
    let failed = if summary.failed > 0 {
        summary.failed.to_string().red().bold()
    } else {
        summary.failed.to_string().normal()
    };
    let errors = if summary.errors > 0 {
        summary.errors.to_string().yellow().bold()
    } else {
        summary.errors.to_string().normal()
    };

    let mut text = format!("{}\n", "─".repeat(50));
    text.push_str(&format!(
        "Test result: {} | {} total, {} passed, {} failed, {} errors\n",
        status,
        summary.total.to_string().bold(),
        summary.passed.to_string().green().bold(),
        failed,
        errors
    ));
    text.push_str(&format!("Assertions: {}\n", summary.assertions));
    text.push_str(&format!("Time: {:.2?}\n", summary.duration));
    text
}

/// Details section for failed and errored tests; empty when everything passed
pub fn problems_text(problems: &[OutcomeRecord]) -> String {
    if problems.is_empty() {
        return String::new();
    }

    let mut text = format!("\n{}\n\n", "Failures:".red().bold());
    for record in problems {
        text.push_str(&format!(
            "  {} {} {}\n",
            "●".red(),
            status_label(record.status),
            record.label.bold()
        ));
        for line in record.detail.lines() {
            text.push_str(&format!("      {}\n", line.dimmed()));
        }
        if let Some(trace) = &record.trace {
            for line in trace.lines() {
                text.push_str(&format!("      {}\n", line.dimmed().italic()));
            }
        }
        text.push('\n');
    }
    text
}
