//! Report sink trait and implementations
//!
//! The verifier writes two kinds of lines: informational progress and
//! error-level findings. Where they end up is up to the sink.

use std::sync::Mutex;

/// Which channel a line was written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Info,
    Error,
}

/// Destination for report lines
pub trait ReportSink: Send + Sync {
    /// Writes an informational line
    fn info(&self, line: &str);

    /// Writes an error-level line
    fn error(&self, line: &str);
}

/// Forwards report lines to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn info(&self, line: &str) {
        tracing::info!("{}", line);
    }

    fn error(&self, line: &str) {
        tracing::error!("{}", line);
    }
}

/// Captures report lines in memory
///
/// Useful for embedding the verifier and for asserting on log order in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Channel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, in write order
    pub fn lines(&self) -> Vec<(Channel, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn info_lines(&self) -> Vec<String> {
        self.lines_on(Channel::Info)
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.lines_on(Channel::Error)
    }

    fn lines_on(&self, channel: Channel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, line)| line)
            .collect()
    }

    fn push(&self, channel: Channel, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((channel, line.to_string()));
    }
}

impl ReportSink for MemorySink {
    fn info(&self, line: &str) {
        self.push(Channel::Info, line);
    }

    fn error(&self, line: &str) {
        self.push(Channel::Error, line);
    }
}
