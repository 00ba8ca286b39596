//! Reporting sinks for the CLI
//!
//! Both reporters plug into the engine through `tally_runtime::ReportSink`.

pub mod json;
pub mod reporter;

pub use json::JsonReporter;
pub use reporter::ConsoleReporter;
