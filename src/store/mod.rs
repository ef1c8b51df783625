//! In-memory sample store and its on-disk form

pub mod persistence;
pub mod window;

pub use persistence::StateFile;
pub use window::Window;

use crate::models::{Sample, Timeframe};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Persisted shape: symbol -> timeframe label -> samples (oldest first).
pub type StoreSnapshot = BTreeMap<String, BTreeMap<String, Window>>;

/// Per-symbol, per-timeframe sample windows.
///
/// Owned by a single scan loop; not synchronised.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    windows: StoreSnapshot,
    max_samples: Option<usize>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every window at `max_samples` entries in addition to age eviction.
    pub fn with_max_samples(mut self, max_samples: Option<usize>) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Append `sample` to the `(symbol, timeframe)` window, creating it on
    /// first use, then evict samples older than the timeframe span as of
    /// the sample's timestamp.
    pub fn record_sample(&mut self, symbol: &str, timeframe: Timeframe, sample: Sample) -> &Window {
        let window = self
            .windows
            .entry(symbol.to_string())
            .or_default()
            .entry(timeframe.label())
            .or_default();
        window.push(sample, timeframe.span(), self.max_samples);
        window
    }

    pub fn window(&self, symbol: &str, timeframe: Timeframe) -> Option<&Window> {
        self.windows.get(symbol)?.get(&timeframe.label())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.windows.keys().map(String::as_str)
    }

    pub fn symbol_count(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.windows.clone()
    }

    /// Replace the whole store. Used once at startup.
    ///
    /// Window keys are normalised through [`Timeframe::from_label`], so files
    /// written with millisecond `min` keys land under the current labels.
    /// Windows whose keys collide after normalisation are merged in time order.
    /// Unrecognised keys are kept as they are.
    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        let mut windows = StoreSnapshot::new();
        for (symbol, by_label) in snapshot {
            let entry: &mut BTreeMap<String, Window> = windows.entry(symbol).or_default();
            for (label, window) in by_label {
                let label = Timeframe::from_label(&label)
                    .map(|tf| tf.label())
                    .unwrap_or(label);
                match entry.get_mut(&label) {
                    Some(existing) => {
                        let mut samples = existing.to_vec();
                        samples.extend(window.iter().copied());
                        samples.sort_by_key(|s| s.observed_at);
                        *existing = Window::from_samples(samples);
                    }
                    None => {
                        entry.insert(label, window);
                    }
                }
            }
        }
        self.windows = windows;
    }

    /// Evict every window against `now` and drop what no longer belongs:
    /// windows for timeframes outside `timeframes`, windows left empty, and
    /// symbols with no windows. Returns the number of windows removed.
    pub fn prune(&mut self, now: DateTime<Utc>, timeframes: &[Timeframe]) -> usize {
        let spans: BTreeMap<String, Timeframe> =
            timeframes.iter().map(|tf| (tf.label(), *tf)).collect();
        let mut removed = 0;

        for by_label in self.windows.values_mut() {
            let before = by_label.len();
            by_label.retain(|label, window| match spans.get(label) {
                Some(tf) => {
                    window.evict(now, tf.span());
                    !window.is_empty()
                }
                None => false,
            });
            removed += before - by_label.len();
        }
        self.windows.retain(|_, by_label| !by_label.is_empty());
        removed
    }
}
