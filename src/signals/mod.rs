//! Signal detection, tallying and message formatting.

pub mod aggregation;
pub mod evaluator;
pub mod messages;

pub use aggregation::AggregationCounter;
pub use evaluator::{percent_change, SignalEvaluator, DEFAULT_FAST_LAG};
pub use messages::{alert_message, summary_message};
