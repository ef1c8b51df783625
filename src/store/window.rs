//! Age-pruned sample window for one symbol and timeframe

use crate::models::Sample;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Chronologically ordered samples no older than the window span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Window {
    samples: VecDeque<Sample>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// Append `sample` and drop everything older than `span` relative to
    /// the sample's own timestamp. `max_len` optionally caps the entry count
    /// by dropping the oldest samples first.
    pub fn push(&mut self, sample: Sample, span: Duration, max_len: Option<usize>) {
        self.samples.push_back(sample);
        self.evict(sample.observed_at, span);

        if let Some(max_len) = max_len {
            while self.samples.len() > max_len.max(1) {
                self.samples.pop_front();
            }
        }
    }

    /// Remove every sample with `now - observed_at > span`.
    /// Filters the whole deque rather than popping from the front: windows
    /// restored from disk are not guaranteed to be ordered.
    pub fn evict(&mut self, now: DateTime<Utc>, span: Duration) {
        self.samples.retain(|s| s.age(now) <= span);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Sample `lag` positions back from the newest one (`lag = 0` is the newest).
    pub fn lagged(&self, lag: usize) -> Option<&Sample> {
        let idx = self.samples.len().checked_sub(lag + 1)?;
        self.samples.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }
}
