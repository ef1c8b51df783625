//! Shared data models spanning the monitor layers.

pub mod sample;
pub mod signal;
pub mod timeframe;

pub use sample::Sample;
pub use signal::{SignalDirection, SignalEvent, SignalKind, SignalSummary};
pub use timeframe::Timeframe;
