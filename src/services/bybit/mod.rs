pub mod messages;
pub mod provider;

pub use provider::{BybitMarketDataProvider, DEFAULT_BASE_URL};
