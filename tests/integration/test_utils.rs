//! In-memory collaborators for driving the scan loop

use async_trait::async_trait;
use spotpulse::services::market_data::MarketDataProvider;
use spotpulse::services::notifier::Notifier;
use spotpulse::{MonitorError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Provider returning scripted listings and prices. A symbol with no
/// scripted price left fails like a transport error.
#[derive(Default)]
pub struct MockProvider {
    listings: Mutex<VecDeque<Result<Vec<String>>>>,
    default_listing: Mutex<Vec<String>>,
    prices: Mutex<HashMap<String, VecDeque<Result<f64>>>>,
    slow_symbols: Mutex<HashMap<String, Duration>>,
    pub price_calls: Mutex<Vec<String>>,
    listing_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockProvider {
    pub fn new(symbols: &[&str]) -> Self {
        let provider = Self::default();
        *provider.default_listing.lock().unwrap() = symbols.iter().map(|s| s.to_string()).collect();
        provider
    }

    /// Queue a one-off listing result ahead of the default listing.
    pub fn push_listing(&self, listing: Result<Vec<String>>) {
        self.listings.lock().unwrap().push_back(listing);
    }

    pub fn push_price(&self, symbol: &str, price: Result<f64>) {
        self.prices
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default()
            .push_back(price);
    }

    pub fn push_prices(&self, symbol: &str, prices: &[f64]) {
        for price in prices {
            self.push_price(symbol, Ok(*price));
        }
    }

    pub fn delay_symbol(&self, symbol: &str, delay: Duration) {
        self.slow_symbols
            .lock()
            .unwrap()
            .insert(symbol.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.price_calls.lock().unwrap().clone()
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn list_tracked_symbols(&self) -> Result<Vec<String>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(listing) = self.listings.lock().unwrap().pop_front() {
            return listing;
        }
        Ok(self.default_listing.lock().unwrap().clone())
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64> {
        self.price_calls.lock().unwrap().push(symbol.to_string());

        let delay = self.slow_symbols.lock().unwrap().get(symbol).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.prices
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(MonitorError::fetch(symbol, "no scripted price")))
    }
}

/// Notifier that keeps every message, optionally rejecting them all.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    fail: bool,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            Err(MonitorError::Notification("channel down".to_string()))
        } else {
            Ok(())
        }
    }
}
