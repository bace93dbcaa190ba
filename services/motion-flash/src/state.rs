//! Per-process monitor session state

use std::fmt;

use chrono::{DateTime, Local};

use crate::error::PollError;

/// A console diagnostic produced by a failed poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    CannotConnect { endpoint: String, detail: String },
    Timeout,
    ApiError(Option<String>),
    Unknown(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CannotConnect { endpoint, detail } => write!(
                f,
                "Cannot connect to {} ({}); make sure the dashboard server is running",
                endpoint, detail
            ),
            Diagnostic::Timeout => write!(f, "Request timeout"),
            Diagnostic::ApiError(Some(message)) => write!(f, "API returned error: {}", message),
            Diagnostic::ApiError(None) => write!(f, "API returned error"),
            Diagnostic::Unknown(detail) => write!(f, "Error: {}", detail),
        }
    }
}

/// Counters that live for the lifetime of one monitor
#[derive(Debug, Default)]
pub struct MonitorSession {
    consecutive_errors: u32,
    last_successful_poll: Option<DateTime<Local>>,
    polls: u64,
    flashes: u64,
}

impl MonitorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn last_successful_poll(&self) -> Option<DateTime<Local>> {
        self.last_successful_poll
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn flashes(&self) -> u64 {
        self.flashes
    }

    pub fn record_flash(&mut self) {
        self.flashes += 1;
    }

    /// A successful poll ends any connection-error streak
    pub fn record_success(&mut self, at: DateTime<Local>) {
        self.polls += 1;
        self.consecutive_errors = 0;
        self.last_successful_poll = Some(at);
    }

    /// Account for a failed poll and decide whether it is worth reporting.
    ///
    /// Connection errors are only reported when they start a streak; every
    /// other kind is reported each time. Only connection errors touch the
    /// streak counter.
    pub fn record_failure(&mut self, err: &PollError, endpoint: &str) -> Option<Diagnostic> {
        self.polls += 1;
        match err {
            PollError::Connection(detail) => {
                self.consecutive_errors += 1;
                (self.consecutive_errors == 1).then(|| Diagnostic::CannotConnect {
                    endpoint: endpoint.to_string(),
                    detail: detail.clone(),
                })
            }
            PollError::Timeout => Some(Diagnostic::Timeout),
            PollError::ApiLogical(message) => Some(Diagnostic::ApiError(message.clone())),
            PollError::Unknown(detail) => Some(Diagnostic::Unknown(detail.clone())),
        }
    }
}
