//! Unit tests for the reporting-period counter

use chrono::{DateTime, Duration, TimeZone, Utc};
use spotpulse::models::{SignalDirection, SignalEvent, SignalKind, SignalSummary};
use spotpulse::signals::AggregationCounter;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn event(direction: SignalDirection) -> SignalEvent {
    SignalEvent {
        symbol: "BTCUSDT".to_string(),
        direction,
        magnitude_pct: 2.0,
        kind: SignalKind::Slow,
        span_label: "window_10min".to_string(),
    }
}

#[test]
fn test_flush_returns_counts_then_resets() {
    let mut counter = AggregationCounter::new(at(0));
    for _ in 0..3 {
        counter.record(&event(SignalDirection::Bullish));
    }
    for _ in 0..2 {
        counter.record(&event(SignalDirection::Bearish));
    }

    let interval = Duration::minutes(60);
    assert_eq!(
        counter.flush(interval),
        SignalSummary {
            bullish: 3,
            bearish: 2
        }
    );
    assert_eq!(counter.flush(interval), SignalSummary::default());
}

#[test]
fn test_should_flush_at_interval_boundary() {
    let counter = AggregationCounter::new(at(0));
    let interval = Duration::minutes(60);

    assert!(!counter.should_flush(at(3599), interval));
    assert!(counter.should_flush(at(3600), interval));
}

#[test]
fn test_flush_advances_by_whole_intervals() {
    let mut counter = AggregationCounter::new(at(0));
    let interval = Duration::minutes(10);

    // Delayed well past the boundary.
    let now = at(35 * 60);
    assert!(counter.should_flush(now, interval));
    counter.flush(interval);
    assert_eq!(counter.period_start(), at(10 * 60));

    // Catch-up: still due on the next cycle.
    assert!(counter.should_flush(now + Duration::seconds(30), interval));
    counter.flush(interval);
    counter.flush(interval);
    assert_eq!(counter.period_start(), at(30 * 60));
    assert!(!counter.should_flush(now + Duration::seconds(30), interval));
}

#[test]
fn test_pending_does_not_reset() {
    let mut counter = AggregationCounter::new(at(0));
    counter.record(&event(SignalDirection::Bearish));

    assert_eq!(counter.pending().bearish, 1);
    assert_eq!(counter.pending().total(), 1);
}
