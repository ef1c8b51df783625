//! Bybit v5 market ticker payloads

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TickersResponse {
    #[serde(rename = "retCode")]
    pub ret_code: i64,
    #[serde(rename = "retMsg", default)]
    pub ret_msg: String,
    pub result: Option<TickersResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickersResult {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub list: Vec<Ticker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    #[serde(rename = "lastPrice", default)]
    pub last_price: String,
    #[serde(rename = "turnover24h", default)]
    pub turnover_24h: String,
}

impl Ticker {
    pub fn last_price(&self) -> Option<f64> {
        self.last_price.parse().ok()
    }

    /// Unparsable turnover ranks last.
    pub fn turnover(&self) -> f64 {
        self.turnover_24h.parse().unwrap_or(0.0)
    }
}

impl TickersResponse {
    pub fn into_list(self) -> Result<Vec<Ticker>, String> {
        if self.ret_code != 0 {
            return Err(format!("retCode {}: {}", self.ret_code, self.ret_msg));
        }
        Ok(self.result.unwrap_or_default().list)
    }
}
