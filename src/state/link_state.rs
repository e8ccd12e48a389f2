//! Link check state definitions
//!
//! A link starts with a lightweight probe, falls back to a full request when
//! the probe is rejected, and ends in exactly one terminal state.

use std::fmt;

/// How a request for a target is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMode {
    /// Existence check without a body (HEAD, or a stat for local files)
    Probe,
    /// GET with the complete body
    Full,
}

/// Represents the current state of a link in the verification process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    // ===== Active States =====
    /// Lightweight existence check pending
    Probe,

    /// Full request pending, either because the probe was rejected or
    /// because the body is needed for hash verification
    RetryAsFull,

    // ===== Terminal States =====
    /// Link resolved with a 2xx status
    Pass,

    /// Link failed with a bad status, a disallowed redirect or a transport error
    Fail,
}

impl LinkState {
    /// Returns the starting state for a link
    ///
    /// Hash verification needs the body, so it skips the probe entirely;
    /// probe-only mode and hash verification never combine.
    pub fn initial(needs_body: bool) -> Self {
        if needs_body {
            Self::RetryAsFull
        } else {
            Self::Probe
        }
    }

    /// The request issued while in this state, None for terminal states
    pub fn request_mode(&self) -> Option<RequestMode> {
        match self {
            Self::Probe => Some(RequestMode::Probe),
            Self::RetryAsFull => Some(RequestMode::Full),
            Self::Pass | Self::Fail => None,
        }
    }

    /// Returns the next state after a response with the given success flag
    pub fn after_response(&self, success: bool) -> Self {
        match (self, success) {
            (_, true) => Self::Pass,
            (Self::Probe, false) => Self::RetryAsFull,
            (_, false) => Self::Fail,
        }
    }

    /// Returns true if this is a terminal state (no further requests)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Pass | Self::Fail)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::RetryAsFull => "retry_as_full",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
