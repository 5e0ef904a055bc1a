// Domain-level errors for config fetches and performance reports.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    Unreachable,
    Timeout,
    ProtocolError(u16),
    MalformedBody,
    RemoteRejected(String),
}

/// Failure of a single config fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub detail: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, detail)
    }

    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Unreachable, detail)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FetchErrorKind::Unreachable => write!(f, "config service unreachable: {}", self.detail),
            FetchErrorKind::Timeout => write!(f, "config request timed out: {}", self.detail),
            FetchErrorKind::ProtocolError(status) => {
                write!(f, "config service returned HTTP {status}: {}", self.detail)
            }
            FetchErrorKind::MalformedBody => {
                write!(f, "config response malformed: {}", self.detail)
            }
            FetchErrorKind::RemoteRejected(message) => {
                write!(f, "config service rejected request: {message}")
            }
        }
    }
}

impl std::error::Error for FetchError {}

/// Failure to transmit a performance snapshot. Logged, never retried.
#[derive(Debug)]
pub enum ReportError {
    Timeout,
    Transport(String),
    Upstream { status: u16, message: Option<String> },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Timeout => write!(f, "performance report timed out"),
            ReportError::Transport(detail) => {
                write!(f, "performance report transport error: {detail}")
            }
            ReportError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "performance report rejected {status}: {message}")
                } else {
                    write!(f, "performance report rejected {status}")
                }
            }
        }
    }
}

impl std::error::Error for ReportError {}
