//! Process configuration, resolved once from the environment at startup

use crate::error::{MonitorError, Result};
use crate::models::Timeframe;
use crate::services::{bybit, telegram};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_THRESHOLD_PCT: f64 = 1.5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REPORT_INTERVAL_MINUTES: u64 = 60;
pub const DEFAULT_STATE_FILE: &str = "data/ticker_data.json";
pub const DEFAULT_ERROR_COOLDOWN_SECS: u64 = 30;
const MIN_LISTING_COOLDOWN_SECS: u64 = 60;
/// Upper bound for every configured interval, cooldown and timeout.
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default wait after a failed listing: twice the poll interval, at least a minute.
pub fn default_listing_cooldown(poll_interval: Duration) -> Duration {
    Duration::from_secs(
        poll_interval
            .as_secs()
            .saturating_mul(2)
            .max(MIN_LISTING_COOLDOWN_SECS),
    )
}

/// Get the current environment (`production`, `sandbox`, ...)
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub api_url: Url,
    pub bot_token: String,
    pub chat_id: String,
}

/// Immutable monitor settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub threshold_pct: f64,
    pub poll_interval: Duration,
    pub timeframes: Vec<Timeframe>,
    pub report_interval: Duration,
    pub fast_lag: usize,
    pub max_samples_per_window: Option<usize>,
    pub top_symbols: usize,
    pub quote_asset: String,
    pub state_file: PathBuf,
    pub log_file: Option<PathBuf>,
    pub bybit_base_url: Url,
    pub telegram: TelegramConfig,
    pub request_timeout: Duration,
    pub throttle: Duration,
    pub listing_cooldown: Duration,
    pub error_cooldown: Duration,
    pub metrics_port: Option<u16>,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Missing credentials are
    /// fatal; every other invalid value falls back to its default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            MonitorError::Configuration("TELEGRAM_BOT_TOKEN is not set".to_string())
        })?;
        let chat_id = get("TELEGRAM_CHAT_ID").ok_or_else(|| {
            MonitorError::Configuration("TELEGRAM_CHAT_ID is not set".to_string())
        })?;

        let threshold_pct = parse_or(&get, "PRICE_THRESHOLD_PCT", DEFAULT_THRESHOLD_PCT, |v: &f64| {
            v.is_finite() && *v > 0.0
        });
        let poll_secs = parse_or(&get, "POLL_INTERVAL_SECONDS", DEFAULT_POLL_INTERVAL_SECS, |v| {
            *v > 0 && *v <= MAX_INTERVAL_SECS
        });
        let report_minutes = parse_or(
            &get,
            "REPORT_INTERVAL_MINUTES",
            DEFAULT_REPORT_INTERVAL_MINUTES,
            |v| *v > 0 && *v <= MAX_INTERVAL_SECS / 60,
        );
        let report_interval = minutes_to_duration(report_minutes).unwrap_or_else(|| {
            warn!(
                value = report_minutes,
                "REPORT_INTERVAL_MINUTES is out of range, using default {}",
                DEFAULT_REPORT_INTERVAL_MINUTES
            );
            Duration::from_secs(DEFAULT_REPORT_INTERVAL_MINUTES * 60)
        });
        let fast_lag = parse_or(&get, "FAST_LAG_POLLS", crate::signals::DEFAULT_FAST_LAG, |v| *v > 0);
        let max_samples_per_window = get("MAX_SAMPLES_PER_WINDOW").and_then(|raw| {
            let parsed = raw.parse::<usize>().ok().filter(|v| *v > 0);
            if parsed.is_none() {
                warn!(value = %raw, "MAX_SAMPLES_PER_WINDOW is invalid, window size is unbounded");
            }
            parsed
        });
        let top_symbols = parse_or(&get, "TOP_SYMBOLS", 100usize, |v| *v > 0);
        let request_timeout_secs = parse_or(&get, "REQUEST_TIMEOUT_SECONDS", 10u64, |v| {
            *v > 0 && *v <= MAX_INTERVAL_SECS
        });
        let throttle_ms = parse_or(&get, "THROTTLE_MS", 100u64, |v| *v <= MAX_INTERVAL_SECS * 1000);
        // Strictly longer than the poll interval.
        let listing_cooldown_secs = parse_or(
            &get,
            "LISTING_COOLDOWN_SECONDS",
            default_listing_cooldown(Duration::from_secs(poll_secs)).as_secs(),
            |v| *v > poll_secs && *v <= MAX_INTERVAL_SECS.saturating_mul(2),
        );
        let error_cooldown_secs = parse_or(
            &get,
            "ERROR_COOLDOWN_SECONDS",
            DEFAULT_ERROR_COOLDOWN_SECS,
            |v| *v > 0 && *v <= MAX_INTERVAL_SECS,
        );
        let metrics_port = get("METRICS_PORT").and_then(|raw| {
            let parsed = raw.parse::<u16>().ok();
            if parsed.is_none() {
                warn!(value = %raw, "METRICS_PORT is invalid, HTTP endpoint disabled");
            }
            parsed
        });

        Ok(Self {
            threshold_pct,
            poll_interval: Duration::from_secs(poll_secs),
            timeframes: parse_timeframes(get("TIMEFRAMES_MINUTES").as_deref()),
            report_interval,
            fast_lag,
            max_samples_per_window,
            top_symbols,
            quote_asset: get("QUOTE_ASSET").unwrap_or_else(|| "USDT".to_string()),
            state_file: get("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            log_file: get("LOG_FILE").map(PathBuf::from),
            bybit_base_url: parse_url(get("BYBIT_BASE_URL"), bybit::DEFAULT_BASE_URL)?,
            telegram: TelegramConfig {
                api_url: parse_url(get("TELEGRAM_API_URL"), telegram::DEFAULT_API_URL)?,
                bot_token,
                chat_id,
            },
            request_timeout: Duration::from_secs(request_timeout_secs),
            throttle: Duration::from_millis(throttle_ms),
            listing_cooldown: Duration::from_secs(listing_cooldown_secs),
            error_cooldown: Duration::from_secs(error_cooldown_secs),
            metrics_port,
        })
    }

    /// Log the resolved settings once at startup.
    pub fn log_summary(&self) {
        info!(threshold_pct = self.threshold_pct, "Signal threshold: {}%", self.threshold_pct);
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Poll interval: {} sec",
            self.poll_interval.as_secs()
        );
        for timeframe in &self.timeframes {
            info!(timeframe = %timeframe.label(), "Timeframe: {}", timeframe);
        }
        info!(
            report_minutes = self.report_interval.as_secs() / 60,
            "Signal report interval: {} min",
            self.report_interval.as_secs() / 60
        );
        info!(state_file = %self.state_file.display(), "State file");
    }
}

fn minutes_to_duration(minutes: u64) -> Option<Duration> {
    minutes.checked_mul(60).map(Duration::from_secs)
}

fn parse_or<T, G, V>(get: &G, key: &str, default: T, valid: V) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
    G: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let Some(raw) = get(key) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            warn!(key = key, value = %raw, default = %default, "Invalid {}, using default {}", key, default);
            default
        }
    }
}

/// Parse a comma-separated list of positive minutes. Duplicates are dropped
/// keeping first occurrence. A missing list, or any bad entry, yields the
/// single default timeframe.
pub fn parse_timeframes(raw: Option<&str>) -> Vec<Timeframe> {
    let Some(raw) = raw else {
        return vec![Timeframe::default()];
    };

    let parsed: std::result::Result<Vec<u64>, _> = raw
        .split(',')
        .map(|s| s.trim().parse::<u64>())
        .collect();

    match parsed {
        Ok(minutes) if !minutes.is_empty() && minutes.iter().all(|m| *m > 0) => {
            let mut timeframes: Vec<Timeframe> = Vec::with_capacity(minutes.len());
            for tf in minutes.into_iter().map(Timeframe::from_minutes) {
                if !timeframes.contains(&tf) {
                    timeframes.push(tf);
                }
            }
            timeframes
        }
        _ => {
            warn!(
                value = %raw,
                "Invalid TIMEFRAMES_MINUTES, falling back to the default {} min timeframe",
                Timeframe::DEFAULT_MINUTES
            );
            vec![Timeframe::default()]
        }
    }
}

fn parse_url(raw: Option<String>, default: &str) -> Result<Url> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| MonitorError::Configuration(format!("invalid URL '{}': {}", raw, e)))
}
