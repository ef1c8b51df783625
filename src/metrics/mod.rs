//! Prometheus metrics for the scan loop and the HTTP surface

use crate::models::SignalEvent;
use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub scan_cycles_total: IntCounter,
    pub scan_cycle_duration_seconds: Histogram,
    pub tracked_symbols: Gauge,
    pub price_fetch_failures_total: IntCounter,
    pub signals_total: IntCounterVec,
    pub notifications_failed_total: IntCounter,
    pub summaries_sent_total: IntCounter,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: Gauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scan_cycles_total =
            IntCounter::with_opts(Opts::new("scan_cycles_total", "Completed scan cycles"))?;
        let scan_cycle_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("scan_cycle_duration_seconds", "Wall time of one scan cycle")
                .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;
        let tracked_symbols = Gauge::with_opts(Opts::new(
            "tracked_symbols",
            "Symbols returned by the last successful listing",
        ))?;
        let price_fetch_failures_total = IntCounter::with_opts(Opts::new(
            "price_fetch_failures_total",
            "Per-symbol price fetches that failed or timed out",
        ))?;
        let signals_total = IntCounterVec::new(
            Opts::new("signals_total", "Threshold events fired"),
            &["direction", "kind"],
        )?;
        let notifications_failed_total = IntCounter::with_opts(Opts::new(
            "notifications_failed_total",
            "Notifications the channel rejected or failed to deliver",
        ))?;
        let summaries_sent_total = IntCounter::with_opts(Opts::new(
            "summaries_sent_total",
            "Periodic signal summaries dispatched",
        ))?;
        let http_requests_total =
            IntCounter::with_opts(Opts::new("http_requests_total", "HTTP requests served"))?;
        let http_requests_in_flight = Gauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;

        registry.register(Box::new(scan_cycles_total.clone()))?;
        registry.register(Box::new(scan_cycle_duration_seconds.clone()))?;
        registry.register(Box::new(tracked_symbols.clone()))?;
        registry.register(Box::new(price_fetch_failures_total.clone()))?;
        registry.register(Box::new(signals_total.clone()))?;
        registry.register(Box::new(notifications_failed_total.clone()))?;
        registry.register(Box::new(summaries_sent_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            scan_cycles_total,
            scan_cycle_duration_seconds,
            tracked_symbols,
            price_fetch_failures_total,
            signals_total,
            notifications_failed_total,
            summaries_sent_total,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    pub fn record_signal(&self, event: &SignalEvent) {
        self.signals_total
            .with_label_values(&[event.direction.as_str(), event.kind.as_str()])
            .inc();
    }

    /// Text exposition of every registered metric.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
