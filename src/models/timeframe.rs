//! Window spans

use chrono::Duration;
use std::fmt;

/// A window span in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timeframe {
    span_ms: u64,
}

impl Timeframe {
    pub const DEFAULT_MINUTES: u64 = 10;

    pub fn from_millis(span_ms: u64) -> Self {
        Self { span_ms }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self::from_millis(minutes.saturating_mul(60_000))
    }

    pub fn span_ms(&self) -> u64 {
        self.span_ms
    }

    pub fn span(&self) -> Duration {
        Duration::milliseconds(self.span_ms.min(i64::MAX as u64) as i64)
    }

    pub fn minutes(&self) -> f64 {
        self.span_ms as f64 / 60_000.0
    }

    /// Key used for the window in the persisted store, e.g. `window_10min`.
    /// Spans that are not whole minutes are labelled in milliseconds.
    pub fn label(&self) -> String {
        if self.span_ms % 60_000 == 0 {
            format!("window_{}min", self.span_ms / 60_000)
        } else {
            format!("window_{}ms", self.span_ms)
        }
    }

    /// Inverse of [`Timeframe::label`]. Also accepts the older layout that
    /// stored the span in milliseconds behind a `min` suffix
    /// (`window_600000min`): a `min` count that is a positive multiple of
    /// 60000 is read as milliseconds.
    pub fn from_label(label: &str) -> Option<Self> {
        let body = label.strip_prefix("window_")?;
        if let Some(ms) = body.strip_suffix("ms") {
            return ms.parse::<u64>().ok().filter(|v| *v > 0).map(Self::from_millis);
        }
        let count = body.strip_suffix("min")?.parse::<u64>().ok().filter(|v| *v > 0)?;
        if count % 60_000 == 0 {
            Some(Self::from_millis(count))
        } else {
            Some(Self::from_minutes(count))
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::from_minutes(Self::DEFAULT_MINUTES)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} min", self.minutes())
    }
}
