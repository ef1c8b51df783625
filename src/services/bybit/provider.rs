//! Bybit spot market data provider implementation

use crate::error::{MonitorError, Result};
use crate::services::market_data::MarketDataProvider;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::messages::{Ticker, TickersResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";
const TICKERS_PATH: &str = "/v5/market/tickers";
const CATEGORY: &str = "spot";

pub struct BybitMarketDataProvider {
    client: Client,
    base_url: Url,
    quote_asset: String,
    top_n: usize,
    listing_retries: usize,
}

impl BybitMarketDataProvider {
    pub fn new(base_url: Url, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| MonitorError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: Url, client: Client) -> Self {
        Self {
            client,
            base_url,
            quote_asset: "USDT".to_string(),
            top_n: 100,
            listing_retries: 2,
        }
    }

    pub fn with_quote_asset(mut self, quote_asset: impl Into<String>) -> Self {
        self.quote_asset = quote_asset.into();
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_listing_retries(mut self, retries: usize) -> Self {
        self.listing_retries = retries;
        self
    }

    async fn fetch_tickers(&self, symbol: Option<&str>) -> std::result::Result<Vec<Ticker>, String> {
        let url = self
            .base_url
            .join(TICKERS_PATH)
            .map_err(|e| format!("invalid URL: {}", e))?;

        let mut query = vec![("category", CATEGORY)];
        if let Some(symbol) = symbol {
            query.push(("symbol", symbol));
        }

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status));
        }

        let body: TickersResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid response: {}", e))?;
        body.into_list()
    }

    /// Keep quote-asset pairs, highest 24h turnover first, top N.
    pub fn rank(&self, tickers: Vec<Ticker>) -> Vec<String> {
        let mut pairs: Vec<Ticker> = tickers
            .into_iter()
            .filter(|t| t.symbol.ends_with(&self.quote_asset))
            .collect();
        pairs.sort_by(|a, b| b.turnover().total_cmp(&a.turnover()));
        pairs.into_iter().take(self.top_n).map(|t| t.symbol).collect()
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for BybitMarketDataProvider {
    async fn list_tracked_symbols(&self) -> Result<Vec<String>> {
        debug!(quote = %self.quote_asset, top_n = self.top_n, "Bybit: ranking symbols by turnover");

        let tickers = (|| self.fetch_tickers(None))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(250))
                    .with_max_times(self.listing_retries),
            )
            .notify(|err: &String, delay: Duration| {
                warn!(error = %err, retry_in_ms = delay.as_millis() as u64, "Bybit: ticker listing failed, retrying");
            })
            .await
            .map_err(MonitorError::UpstreamUnavailable)?;

        let symbols = self.rank(tickers);
        info!(count = symbols.len(), "Bybit: found {} symbols", symbols.len());
        Ok(symbols)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64> {
        let tickers = self
            .fetch_tickers(Some(symbol))
            .await
            .map_err(|e| MonitorError::fetch(symbol, e))?;

        let ticker = tickers
            .first()
            .ok_or_else(|| MonitorError::fetch(symbol, "empty ticker list"))?;

        ticker
            .last_price()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| {
                MonitorError::fetch(symbol, format!("unusable lastPrice '{}'", ticker.last_price))
            })
    }
}
