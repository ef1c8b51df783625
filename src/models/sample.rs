//! Timestamped price observations

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One price observation. Immutable once recorded.
///
/// Serialised as `{"price": <f64>, "time": <unix seconds as f64>}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub price: f64,
    #[serde(rename = "time", with = "unix_seconds")]
    pub observed_at: DateTime<Utc>,
}

impl Sample {
    pub fn new(price: f64, observed_at: DateTime<Utc>) -> Self {
        Self { price, observed_at }
    }

    /// Age of the sample relative to `now`. Negative for samples from the future.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.observed_at)
    }
}

pub(crate) mod unix_seconds {
    use super::*;
    use serde::{de, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let seconds = value.timestamp_micros() as f64 / 1_000_000.0;
        serializer.serialize_f64(seconds)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        from_seconds(seconds)
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", seconds)))
    }

    pub fn from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
        if !seconds.is_finite() {
            return None;
        }
        let micros = (seconds * 1_000_000.0).round();
        if micros.abs() > i64::MAX as f64 {
            return None;
        }
        Utc.timestamp_micros(micros as i64).single()
    }
}
