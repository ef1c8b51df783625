//! Market data provider interface consumed by the scan loop.

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Ranked list of symbols to track this cycle. The ranking policy is the
    /// provider's business; callers treat the result as an opaque top-N list.
    async fn list_tracked_symbols(&self) -> Result<Vec<String>>;

    /// Get the latest price for a symbol
    async fn get_latest_price(&self, symbol: &str) -> Result<f64>;
}
