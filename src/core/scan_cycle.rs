//! Sequential polling loop: list, fetch, record, evaluate, notify, persist

use crate::config::{self, MonitorConfig};
use crate::core::http::SharedHealth;
use crate::error::{MonitorError, Result};
use crate::metrics::Metrics;
use crate::models::{Sample, SignalSummary, Timeframe};
use crate::services::market_data::MarketDataProvider;
use crate::services::notifier::Notifier;
use crate::signals::{alert_message, summary_message, AggregationCounter, SignalEvaluator};
use crate::store::{SampleStore, StateFile};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Settings the scan loop needs, split out of [`MonitorConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub threshold_pct: f64,
    pub fast_lag: usize,
    pub timeframes: Vec<Timeframe>,
    pub poll_interval: Duration,
    pub report_interval: Duration,
    pub max_samples_per_window: Option<usize>,
    pub request_timeout: Duration,
    pub throttle: Duration,
    pub listing_cooldown: Duration,
    pub error_cooldown: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let poll_interval = Duration::from_secs(config::DEFAULT_POLL_INTERVAL_SECS);
        Self {
            threshold_pct: config::DEFAULT_THRESHOLD_PCT,
            fast_lag: crate::signals::DEFAULT_FAST_LAG,
            timeframes: vec![Timeframe::default()],
            poll_interval,
            report_interval: Duration::from_secs(config::DEFAULT_REPORT_INTERVAL_MINUTES * 60),
            max_samples_per_window: None,
            request_timeout: Duration::from_secs(10),
            throttle: Duration::from_millis(100),
            listing_cooldown: config::default_listing_cooldown(poll_interval),
            error_cooldown: Duration::from_secs(config::DEFAULT_ERROR_COOLDOWN_SECS),
        }
    }
}

impl From<&MonitorConfig> for ScanConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            threshold_pct: config.threshold_pct,
            fast_lag: config.fast_lag,
            timeframes: config.timeframes.clone(),
            poll_interval: config.poll_interval,
            report_interval: config.report_interval,
            max_samples_per_window: config.max_samples_per_window,
            request_timeout: config.request_timeout,
            throttle: config.throttle,
            listing_cooldown: config.listing_cooldown,
            error_cooldown: config.error_cooldown,
        }
    }
}

/// What one pass over the symbol list did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub symbols_listed: usize,
    pub symbols_scanned: usize,
    pub fetch_failures: usize,
    pub signals: usize,
    pub summary: Option<SignalSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Every listed symbol was visited and the store was persisted.
    Completed(CycleReport),
    /// Listing failed or came back empty; nothing was touched.
    UpstreamUnavailable,
    /// Shutdown was requested between symbols.
    Interrupted(CycleReport),
}

/// Owns the sample store and the signal tally for the life of the process.
/// Cycles run strictly one after another; nothing here is shared.
pub struct ScanCycle {
    config: ScanConfig,
    provider: Arc<dyn MarketDataProvider>,
    notifier: Arc<dyn Notifier>,
    state_file: StateFile,
    store: SampleStore,
    evaluator: SignalEvaluator,
    counter: AggregationCounter,
    metrics: Option<Arc<Metrics>>,
    health: Option<SharedHealth>,
}

impl ScanCycle {
    pub fn new(
        config: ScanConfig,
        provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        state_file: StateFile,
    ) -> Self {
        let evaluator = SignalEvaluator::new(config.threshold_pct).with_fast_lag(config.fast_lag);
        let store = SampleStore::new().with_max_samples(config.max_samples_per_window);
        Self {
            config,
            provider,
            notifier,
            state_file,
            store,
            evaluator,
            counter: AggregationCounter::new(Utc::now()),
            metrics: None,
            health: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Publish each cycle's outcome to `health`.
    pub fn with_health(mut self, health: SharedHealth) -> Self {
        self.health = Some(health);
        self
    }

    /// Start the first reporting period at `period_start` instead of now.
    pub fn with_period_start(mut self, period_start: DateTime<Utc>) -> Self {
        self.counter = AggregationCounter::new(period_start);
        self
    }

    /// Load the persisted store; unreadable state means a cold start.
    pub async fn restore_state(&mut self) {
        let snapshot = self.state_file.load_or_default().await;
        self.store.restore(snapshot);
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn counter(&self) -> &AggregationCounter {
        &self.counter
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub async fn persist(&self) -> Result<()> {
        self.state_file.save(&self.store.snapshot()).await
    }

    async fn report_health(&self, outcome: &str, healthy: bool) {
        if let Some(ref health) = self.health {
            health.write().await.record_cycle(Utc::now(), outcome, healthy);
        }
    }

    async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.config.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(MonitorError::Timeout {
                operation: operation.to_string(),
                seconds: self.config.request_timeout.as_secs(),
            }),
        }
    }

    async fn send(&self, message: &str) {
        match self.bounded("notify", self.notifier.notify(message)).await {
            Ok(()) => debug!(channel = self.notifier.name(), "Notification sent: {}", message),
            Err(e) => {
                error!(
                    channel = self.notifier.name(),
                    phase = "notify",
                    error = %e,
                    "Failed to send notification: {}",
                    message
                );
                if let Some(ref metrics) = self.metrics {
                    metrics.notifications_failed_total.inc();
                }
            }
        }
    }

    async fn flush_report(&mut self) -> SignalSummary {
        let summary = self.counter.flush(to_chrono(self.config.report_interval));
        let message = summary_message(&summary, self.config.report_interval);
        info!(
            bullish = summary.bullish,
            bearish = summary.bearish,
            "Report: {}",
            message
        );
        self.send(&message).await;
        if let Some(ref metrics) = self.metrics {
            metrics.summaries_sent_total.inc();
        }
        summary
    }

    /// Record one price for every timeframe and act on any fired events.
    /// Returns the number of events.
    async fn process_price(&mut self, symbol: &str, sample: Sample) -> usize {
        let mut fired = 0;
        for timeframe in self.config.timeframes.clone() {
            let window = self.store.record_sample(symbol, timeframe, sample);
            let events = self.evaluator.evaluate(symbol, timeframe, window, sample.price);

            for event in &events {
                let message =
                    alert_message(event, timeframe, self.config.poll_interval, self.evaluator.fast_lag());
                info!(
                    symbol = %symbol,
                    timeframe = %event.span_label,
                    direction = event.direction.as_str(),
                    kind = event.kind.as_str(),
                    magnitude_pct = event.magnitude_pct,
                    "Signal: {}",
                    message
                );
                self.send(&message).await;
                self.counter.record(event);
                if let Some(ref metrics) = self.metrics {
                    metrics.record_signal(event);
                }
            }
            fired += events.len();

            if !self.config.throttle.is_zero() {
                tokio::time::sleep(self.config.throttle).await;
            }
        }
        fired
    }

    /// One pass over the tracked symbols, stamped with `now`.
    pub async fn scan(
        &mut self,
        now: DateTime<Utc>,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<CycleOutcome> {
        let symbols = match self
            .bounded("list symbols", self.provider.list_tracked_symbols())
            .await
        {
            Ok(symbols) if !symbols.is_empty() => symbols,
            Ok(_) => {
                warn!(phase = "list", "No symbols returned, skipping cycle");
                return Ok(CycleOutcome::UpstreamUnavailable);
            }
            Err(e) => {
                warn!(phase = "list", error = %e, "Could not list symbols, skipping cycle");
                return Ok(CycleOutcome::UpstreamUnavailable);
            }
        };

        if let Some(ref metrics) = self.metrics {
            metrics.tracked_symbols.set(symbols.len() as f64);
        }

        let mut report = CycleReport {
            symbols_listed: symbols.len(),
            ..CycleReport::default()
        };

        if self
            .counter
            .should_flush(now, to_chrono(self.config.report_interval))
        {
            report.summary = Some(self.flush_report().await);
        }

        for symbol in &symbols {
            if *shutdown.borrow() {
                info!(
                    scanned = report.symbols_scanned,
                    remaining = symbols.len() - report.symbols_scanned,
                    "Shutdown requested, stopping scan"
                );
                return Ok(CycleOutcome::Interrupted(report));
            }

            report.symbols_scanned += 1;
            let price = match self
                .bounded("fetch price", self.provider.get_latest_price(symbol))
                .await
            {
                Ok(price) => price,
                Err(e) => {
                    warn!(symbol = %symbol, phase = "fetch", error = %e, "Price fetch failed, skipping symbol");
                    report.fetch_failures += 1;
                    if let Some(ref metrics) = self.metrics {
                        metrics.price_fetch_failures_total.inc();
                    }
                    continue;
                }
            };

            report.signals += self.process_price(symbol, Sample::new(price, now)).await;
        }

        let pruned = self.store.prune(now, &self.config.timeframes);
        if pruned > 0 {
            debug!(windows = pruned, "Pruned stale windows");
        }

        self.persist().await?;
        Ok(CycleOutcome::Completed(report))
    }

    /// Run cycles until `shutdown` flips to true, then persist and return.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            timeframes = self.config.timeframes.len(),
            interval_secs = self.config.poll_interval.as_secs(),
            "ScanCycle: started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let started = Instant::now();
            let delay = match self.scan(Utc::now(), &shutdown).await {
                Ok(CycleOutcome::Completed(report)) => {
                    self.report_health("completed", true).await;
                    if let Some(ref metrics) = self.metrics {
                        metrics.scan_cycles_total.inc();
                        metrics
                            .scan_cycle_duration_seconds
                            .observe(started.elapsed().as_secs_f64());
                    }
                    info!(
                        signals = report.signals,
                        scanned = report.symbols_scanned,
                        fetch_failures = report.fetch_failures,
                        "Cycle complete. Signals: {}. Sleeping {} sec",
                        report.signals,
                        self.config.poll_interval.as_secs()
                    );
                    self.config.poll_interval
                }
                Ok(CycleOutcome::UpstreamUnavailable) => {
                    self.report_health("upstream_unavailable", false).await;
                    warn!(
                        cooldown_secs = self.config.listing_cooldown.as_secs(),
                        "Upstream unavailable, cooling down"
                    );
                    self.config.listing_cooldown
                }
                Ok(CycleOutcome::Interrupted(_)) => break,
                Err(e) => {
                    self.report_health("error", false).await;
                    error!(
                        error = %e,
                        cooldown_secs = self.config.error_cooldown.as_secs(),
                        "Error in scan cycle, cooling down"
                    );
                    self.config.error_cooldown
                }
            };

            if sleep_or_shutdown(delay, &mut shutdown).await {
                break;
            }
        }

        if let Err(e) = self.persist().await {
            error!(error = %e, phase = "shutdown", "Failed to persist state on shutdown");
        }
        info!("ScanCycle: stopped");
        Ok(())
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(duration.as_millis().min(i64::MAX as u128) as i64)
}

/// Sleep for `delay` unless shutdown is requested first. Returns true on shutdown.
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    // `sleep` clamps deadlines past the timer's range instead of overflowing.
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        if *shutdown.borrow() {
            return true;
        }
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    // Sender gone: nobody can request shutdown any more.
                    sleep.as_mut().await;
                    return false;
                }
            }
        }
    }
}
