//! Output module for issues and reports
//!
//! This module handles:
//! - Collecting issues in detection order
//! - Routing informational and error lines to a report sink
//! - Rendering the grouped end-of-run summary

mod issues;
mod summary;
mod traits;

pub use issues::{Issue, IssueCollector};
pub use summary::{format_count, format_summary};
pub use traits::{Channel, MemorySink, ReportSink, TracingSink};
