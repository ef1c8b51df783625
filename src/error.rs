//! Error taxonomy for the monitor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

/// Failure classes the scan loop distinguishes between.
///
/// Only `Configuration` is fatal; everything else is logged and the loop
/// either skips the affected symbol or cools down before the next cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("price fetch failed for {symbol}: {reason}")]
    TransientFetch { symbol: String, reason: String },

    #[error("symbol listing unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("state file {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("unexpected error: {0}")]
    Unclassified(String),
}

impl MonitorError {
    pub fn fetch(symbol: impl Into<String>, reason: impl ToString) -> Self {
        MonitorError::TransientFetch {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence(path: impl Into<String>, reason: impl ToString) -> Self {
        MonitorError::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the process should stop instead of retrying.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonitorError::Configuration(_))
    }
}

impl From<prometheus::Error> for MonitorError {
    fn from(err: prometheus::Error) -> Self {
        MonitorError::Unclassified(format!("metrics: {}", err))
    }
}
