//! Multi-timeframe price movement monitor.
//!
//! Samples spot prices on a fixed cadence, keeps an age-pruned window of
//! samples per symbol and timeframe, and raises alerts when the price moves
//! past a percentage threshold over a whole window (slow) or over the last
//! few polls (fast).

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod store;

pub use error::{MonitorError, Result};
