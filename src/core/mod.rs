//! Core application primitives (scan loop, runtime, HTTP surface)

pub mod http;
pub mod runtime;
pub mod scan_cycle;

pub use runtime::MonitorRuntime;
pub use scan_cycle::{CycleOutcome, CycleReport, ScanConfig, ScanCycle};
