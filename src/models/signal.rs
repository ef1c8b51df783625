//! Threshold-crossing events and their periodic summary

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Bullish,
    Bearish,
}

impl SignalDirection {
    /// Direction of a non-zero percentage change. Zero maps to bearish, but a
    /// zero change never reaches a positive threshold so it never fires.
    pub fn from_change(pct_change: f64) -> Self {
        if pct_change > 0.0 {
            SignalDirection::Bullish
        } else {
            SignalDirection::Bearish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Bullish => "bullish",
            SignalDirection::Bearish => "bearish",
        }
    }
}

/// Which reference sample the change was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Oldest sample still in the window.
    Slow,
    /// Sample a fixed number of polls back.
    Fast,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Slow => "slow",
            SignalKind::Fast => "fast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: String,
    pub direction: SignalDirection,
    /// Absolute percentage change, always non-negative.
    pub magnitude_pct: f64,
    pub kind: SignalKind,
    pub span_label: String,
}

/// Directional counts flushed at the end of a reporting period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub bullish: u64,
    pub bearish: u64,
}

impl SignalSummary {
    pub fn total(&self) -> u64 {
        self.bullish + self.bearish
    }
}

impl fmt::Display for SignalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bullish signals {} | bearish signals {}",
            self.bullish, self.bearish
        )
    }
}
