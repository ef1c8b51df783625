//! Bybit adapter against a mocked v5 REST API

use serde_json::{json, Value};
use spotpulse::services::bybit::BybitMarketDataProvider;
use spotpulse::services::market_data::MarketDataProvider;
use spotpulse::MonitorError;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> BybitMarketDataProvider {
    let base_url = Url::parse(&server.uri()).unwrap();
    BybitMarketDataProvider::with_client(base_url, reqwest::Client::new()).with_listing_retries(0)
}

fn tickers(list: Value) -> Value {
    json!({
        "retCode": 0,
        "retMsg": "OK",
        "result": { "category": "spot", "list": list },
        "time": 1709294400000u64
    })
}

#[tokio::test]
async fn test_listing_keeps_top_quote_pairs_by_turnover() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .and(query_param("category", "spot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickers(json!([
            { "symbol": "ETHUSDT", "lastPrice": "3400.5", "turnover24h": "900000000" },
            { "symbol": "BTCUSDC", "lastPrice": "62000", "turnover24h": "5000000000" },
            { "symbol": "BTCUSDT", "lastPrice": "62010", "turnover24h": "2500000000" },
            { "symbol": "DOGEUSDT", "lastPrice": "0.12", "turnover24h": "1200000" },
            { "symbol": "SOLUSDT", "lastPrice": "130", "turnover24h": "not-a-number" }
        ]))))
        .mount(&server)
        .await;

    let symbols = provider(&server).with_top_n(3).list_tracked_symbols().await.unwrap();

    assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT", "DOGEUSDT"]);
}

#[tokio::test]
async fn test_listing_honours_quote_asset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickers(json!([
            { "symbol": "ETHUSDT", "lastPrice": "3400.5", "turnover24h": "900000000" },
            { "symbol": "BTCUSDC", "lastPrice": "62000", "turnover24h": "5000000000" }
        ]))))
        .mount(&server)
        .await;

    let symbols = provider(&server)
        .with_quote_asset("USDC")
        .list_tracked_symbols()
        .await
        .unwrap();

    assert_eq!(symbols, vec!["BTCUSDC"]);
}

#[tokio::test]
async fn test_listing_error_code_is_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "retCode": 10006,
            "retMsg": "Too many visits!",
            "result": {}
        })))
        .mount(&server)
        .await;

    let err = provider(&server).list_tracked_symbols().await.unwrap_err();

    match err {
        MonitorError::UpstreamUnavailable(reason) => assert!(reason.contains("10006")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_listing_retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickers(json!([
            { "symbol": "BTCUSDT", "lastPrice": "62010", "turnover24h": "2500000000" }
        ]))))
        .with_priority(2)
        .mount(&server)
        .await;

    let symbols = provider(&server)
        .with_listing_retries(2)
        .list_tracked_symbols()
        .await
        .unwrap();

    assert_eq!(symbols, vec!["BTCUSDT"]);
}

#[tokio::test]
async fn test_latest_price_is_parsed_for_symbol() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .and(query_param("category", "spot"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickers(json!([
            { "symbol": "BTCUSDT", "lastPrice": "62010.25", "turnover24h": "2500000000" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let price = provider(&server).get_latest_price("BTCUSDT").await.unwrap();

    assert_eq!(price, 62010.25);
}

#[tokio::test]
async fn test_latest_price_empty_list_is_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickers(json!([]))))
        .mount(&server)
        .await;

    let err = provider(&server).get_latest_price("GONEUSDT").await.unwrap_err();

    assert!(matches!(err, MonitorError::TransientFetch { ref symbol, .. } if symbol == "GONEUSDT"));
}

#[tokio::test]
async fn test_latest_price_rejects_unusable_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tickers(json!([
            { "symbol": "BADUSDT", "lastPrice": "0", "turnover24h": "1" }
        ]))))
        .mount(&server)
        .await;

    let err = provider(&server).get_latest_price("BADUSDT").await.unwrap_err();

    assert!(matches!(err, MonitorError::TransientFetch { .. }));
}

#[tokio::test]
async fn test_latest_price_http_error_is_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v5/market/tickers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = provider(&server).get_latest_price("BTCUSDT").await.unwrap_err();

    assert!(matches!(err, MonitorError::TransientFetch { .. }));
    assert!(!err.is_fatal());
}
