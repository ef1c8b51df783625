//! Slow/fast threshold detection over a sample window

use crate::models::{SignalDirection, SignalEvent, SignalKind, Timeframe};
use crate::store::Window;

pub const DEFAULT_FAST_LAG: usize = 3;

/// Decides whether a new price crosses the threshold relative to the
/// window's oldest sample (slow) or to a sample a fixed number of polls
/// back (fast). Both checks share one threshold and may fire together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalEvaluator {
    threshold_pct: f64,
    fast_lag: usize,
}

impl SignalEvaluator {
    pub fn new(threshold_pct: f64) -> Self {
        Self {
            threshold_pct,
            fast_lag: DEFAULT_FAST_LAG,
        }
    }

    pub fn with_fast_lag(mut self, fast_lag: usize) -> Self {
        self.fast_lag = fast_lag.max(1);
        self
    }

    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    pub fn fast_lag(&self) -> usize {
        self.fast_lag
    }

    /// Evaluate `current_price` against `window`. Pure: same inputs, same events.
    pub fn evaluate(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        window: &Window,
        current_price: f64,
    ) -> Vec<SignalEvent> {
        let mut events = Vec::with_capacity(2);

        if window.len() >= 2 {
            if let Some(event) = window
                .oldest()
                .and_then(|reference| self.check(reference.price, current_price))
                .map(|(direction, magnitude)| {
                    self.event(symbol, timeframe, direction, magnitude, SignalKind::Slow)
                })
            {
                events.push(event);
            }
        }

        if window.len() > self.fast_lag {
            if let Some(event) = window
                .lagged(self.fast_lag)
                .and_then(|reference| self.check(reference.price, current_price))
                .map(|(direction, magnitude)| {
                    self.event(symbol, timeframe, direction, magnitude, SignalKind::Fast)
                })
            {
                events.push(event);
            }
        }

        events
    }

    fn check(&self, reference: f64, current: f64) -> Option<(SignalDirection, f64)> {
        let pct_change = percent_change(reference, current)?;
        if pct_change.abs() >= self.threshold_pct {
            Some((SignalDirection::from_change(pct_change), pct_change.abs()))
        } else {
            None
        }
    }

    fn event(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        direction: SignalDirection,
        magnitude_pct: f64,
        kind: SignalKind,
    ) -> SignalEvent {
        SignalEvent {
            symbol: symbol.to_string(),
            direction,
            magnitude_pct,
            kind,
            span_label: timeframe.label(),
        }
    }
}

/// Percentage change from `reference` to `current`; `None` when the
/// reference is not a usable positive price.
pub fn percent_change(reference: f64, current: f64) -> Option<f64> {
    if !(reference.is_finite() && reference > 0.0 && current.is_finite()) {
        return None;
    }
    Some((current - reference) / reference * 100.0)
}
