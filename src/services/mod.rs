//! External collaborators: market data and notification delivery.

pub mod bybit;
pub mod market_data;
pub mod notifier;
pub mod telegram;

pub use bybit::BybitMarketDataProvider;
pub use market_data::MarketDataProvider;
pub use notifier::{FanoutNotifier, LogNotifier, Notifier};
pub use telegram::TelegramNotifier;
