//! Unit tests for alert and report text

use spotpulse::models::{SignalDirection, SignalEvent, SignalKind, SignalSummary, Timeframe};
use spotpulse::signals::{alert_message, summary_message};
use std::time::Duration;

fn event(direction: SignalDirection, kind: SignalKind) -> SignalEvent {
    SignalEvent {
        symbol: "SOLUSDT".to_string(),
        direction,
        magnitude_pct: 3.456,
        kind,
        span_label: "window_15min".to_string(),
    }
}

#[test]
fn test_slow_alert_quotes_window_minutes() {
    let msg = alert_message(
        &event(SignalDirection::Bullish, SignalKind::Slow),
        Timeframe::from_minutes(15),
        Duration::from_secs(20),
        3,
    );
    assert_eq!(msg, "SOLUSDT up 3.46% in 15 min");
}

#[test]
fn test_fast_alert_quotes_lag_seconds() {
    let msg = alert_message(
        &event(SignalDirection::Bearish, SignalKind::Fast),
        Timeframe::from_minutes(15),
        Duration::from_secs(20),
        3,
    );
    assert_eq!(msg, "SOLUSDT DUMP!!! 3.46% in 60 sec");
}

#[test]
fn test_summary_message() {
    let summary = SignalSummary {
        bullish: 4,
        bearish: 1,
    };
    assert_eq!(
        summary_message(&summary, Duration::from_secs(30 * 60)),
        "Last 30 min: bullish signals 4 | bearish signals 1"
    );
}
