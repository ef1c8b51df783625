//! Unit tests for the JSON state file

use chrono::{TimeZone, Utc};
use spotpulse::models::{Sample, Timeframe};
use spotpulse::store::{SampleStore, StateFile};
use tempfile::tempdir;

#[tokio::test]
async fn test_missing_file_loads_empty() {
    let dir = tempdir().unwrap();
    let state = StateFile::new(dir.path().join("absent.json"));

    let snapshot = state.load().await.unwrap();
    assert!(snapshot.is_empty());
}

#[tokio::test]
async fn test_save_then_load_round_trip() {
    let dir = tempdir().unwrap();
    let state = StateFile::new(dir.path().join("data").join("ticker_data.json"));

    let mut store = SampleStore::new();
    let tf = Timeframe::from_minutes(10);
    for i in 0..3 {
        let t = Utc.timestamp_opt(1_700_000_000 + i * 60, 250_000_000).unwrap();
        store.record_sample("SOLUSDT", tf, Sample::new(20.0 + i as f64, t));
    }

    state.save(&store.snapshot()).await.unwrap();
    let loaded = state.load().await.unwrap();

    assert_eq!(loaded, store.snapshot());
    assert!(!dir.path().join("data").join("ticker_data.json.tmp").exists());
}

#[tokio::test]
async fn test_persisted_layout_uses_labels_and_unix_seconds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let state = StateFile::new(&path);

    let mut store = SampleStore::new();
    let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    store.record_sample("BTCUSDT", Timeframe::from_minutes(10), Sample::new(100.0, t));
    state.save(&store.snapshot()).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["BTCUSDT"]["window_10min"][0]["price"], 100.0);
    assert_eq!(raw["BTCUSDT"]["window_10min"][0]["time"], 1_700_000_000.0);
}

#[tokio::test]
async fn test_malformed_file_is_an_error_but_loads_as_cold_start() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();
    let state = StateFile::new(&path);

    assert!(state.load().await.is_err());
    assert!(state.load_or_default().await.is_empty());
}

#[tokio::test]
async fn test_wrong_shape_loads_as_cold_start() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"BTCUSDT": {"window_10min": [{"price": "abc"}]}}"#).unwrap();

    assert!(StateFile::new(&path).load_or_default().await.is_empty());
}
