//! Human-readable alert and report text

use crate::models::{SignalDirection, SignalEvent, SignalKind, SignalSummary, Timeframe};
use std::time::Duration;

/// Alert text for one event. Slow events quote the window span, fast events
/// quote the lag expressed in seconds of polling.
pub fn alert_message(
    event: &SignalEvent,
    timeframe: Timeframe,
    poll_interval: Duration,
    fast_lag: usize,
) -> String {
    match event.kind {
        SignalKind::Slow => {
            let verb = match event.direction {
                SignalDirection::Bullish => "up",
                SignalDirection::Bearish => "down",
            };
            format!(
                "{} {} {:.2}% in {:.0} min",
                event.symbol,
                verb,
                event.magnitude_pct,
                timeframe.minutes()
            )
        }
        SignalKind::Fast => {
            let verb = match event.direction {
                SignalDirection::Bullish => "PUMP!!!",
                SignalDirection::Bearish => "DUMP!!!",
            };
            format!(
                "{} {} {:.2}% in {} sec",
                event.symbol,
                verb,
                event.magnitude_pct,
                poll_interval.as_secs() * fast_lag as u64
            )
        }
    }
}

pub fn summary_message(summary: &SignalSummary, report_interval: Duration) -> String {
    format!(
        "Last {} min: {}",
        report_interval.as_secs() / 60,
        summary
    )
}
