//! Directional signal tally over a reporting period

use crate::models::{SignalDirection, SignalEvent, SignalSummary};
use chrono::{DateTime, Duration, Utc};

/// Counts bullish and bearish events until the reporting period elapses.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationCounter {
    bullish: u64,
    bearish: u64,
    period_start: DateTime<Utc>,
}

impl AggregationCounter {
    pub fn new(period_start: DateTime<Utc>) -> Self {
        Self {
            bullish: 0,
            bearish: 0,
            period_start,
        }
    }

    pub fn record(&mut self, event: &SignalEvent) {
        match event.direction {
            SignalDirection::Bullish => self.bullish += 1,
            SignalDirection::Bearish => self.bearish += 1,
        }
    }

    pub fn should_flush(&self, now: DateTime<Utc>, report_interval: Duration) -> bool {
        now.signed_duration_since(self.period_start) >= report_interval
    }

    /// Return the counts, reset them, and move the period start forward by
    /// exactly one interval. A cycle delayed past several intervals therefore
    /// reports again on the following cycles until the boundary catches up.
    pub fn flush(&mut self, report_interval: Duration) -> SignalSummary {
        let summary = self.pending();
        self.bullish = 0;
        self.bearish = 0;
        self.period_start += report_interval;
        summary
    }

    pub fn pending(&self) -> SignalSummary {
        SignalSummary {
            bullish: self.bullish,
            bearish: self.bearish,
        }
    }

    pub fn period_start(&self) -> DateTime<Utc> {
        self.period_start
    }
}
