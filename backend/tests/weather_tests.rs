//! Weather service tests
//!
//! Cache lookup freshness, malformed keys and the fetch-then-cache path.

mod common;

use std::sync::Arc;

use chrono::Duration;
use common::*;
use irrigation_planner::services::{CacheLookup, WeatherService};
use shared::ForecastSummary;

fn service(store: Arc<FakeStore>, provider: Arc<FakeProvider>) -> WeatherService {
    WeatherService::new(store, provider, Duration::minutes(30))
}

// ============================================================================
// Cache lookup
// ============================================================================

#[tokio::test]
async fn test_fresh_cache_entry_is_hit() {
    let now = at(2024, 6, 10, 12, 0);
    let store = FakeStore::new();
    let cached = bundle(day_samples(date(2024, 6, 10), 22.0, 55.0, 0.0));
    store.seed_cache(konya(), cached.clone(), now - Duration::minutes(29));

    let weather = service(store, FakeProvider::failing());
    assert_eq!(
        weather.lookup_cached("37.87,32.48", now).await,
        CacheLookup::Hit(cached)
    );
}

#[tokio::test]
async fn test_entry_exactly_at_ttl_is_still_fresh() {
    let now = at(2024, 6, 10, 12, 0);
    let store = FakeStore::new();
    store.seed_cache(konya(), bundle(vec![]), now - Duration::minutes(30));

    let weather = service(store, FakeProvider::failing());
    assert!(matches!(
        weather.lookup_cached("37.87,32.48", now).await,
        CacheLookup::Hit(_)
    ));
}

#[tokio::test]
async fn test_stale_cache_entry_is_miss() {
    let now = at(2024, 6, 10, 12, 0);
    let store = FakeStore::new();
    store.seed_cache(konya(), bundle(vec![]), now - Duration::minutes(31));

    let weather = service(store, FakeProvider::failing());
    assert_eq!(weather.lookup_cached("37.87,32.48", now).await, CacheLookup::Miss);
}

#[tokio::test]
async fn test_missing_entry_is_miss() {
    let weather = service(FakeStore::new(), FakeProvider::failing());
    assert_eq!(
        weather.lookup_cached("37.87,32.48", at(2024, 6, 10, 12, 0)).await,
        CacheLookup::Miss
    );
}

#[tokio::test]
async fn test_malformed_location_keys_are_miss() {
    let now = at(2024, 6, 10, 12, 0);
    let store = FakeStore::new();
    store.seed_cache(konya(), bundle(vec![]), now);
    let weather = service(store, FakeProvider::failing());

    for key in ["37.87", "37.87,", ",32.48", "", "north,east"] {
        assert_eq!(weather.lookup_cached(key, now).await, CacheLookup::Miss, "{key:?}");
    }
}

#[tokio::test]
async fn test_key_whitespace_is_tolerated() {
    let now = at(2024, 6, 10, 12, 0);
    let store = FakeStore::new();
    store.seed_cache(konya(), bundle(vec![]), now);
    let weather = service(store, FakeProvider::failing());

    assert!(weather.lookup_cached(" 37.87 , 32.48 ", now).await.into_bundle().is_some());
}

// ============================================================================
// Forecast retrieval
// ============================================================================

#[tokio::test]
async fn test_forecast_for_prefers_fresh_cache() {
    let now = at(2024, 6, 10, 12, 0);
    let store = FakeStore::new();
    store.seed_cache(konya(), bundle(vec![]), now - Duration::minutes(5));
    let provider = FakeProvider::ok(bundle(day_samples(date(2024, 6, 10), 30.0, 40.0, 0.0)));

    let weather = service(store, provider.clone());
    let forecast = weather.forecast_for(konya(), now).await.unwrap();

    assert!(forecast.samples.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_forecast_for_fetches_and_caches_on_miss() {
    let now = at(2024, 6, 10, 12, 0);
    let store = FakeStore::new();
    let fresh = bundle(day_samples(date(2024, 6, 10), 30.0, 40.0, 0.0));
    let provider = FakeProvider::ok(fresh.clone());

    let weather = service(store.clone(), provider.clone());
    let forecast = weather.forecast_for(konya(), now).await.unwrap();

    assert_eq!(forecast, fresh);
    assert_eq!(provider.call_count(), 1);

    let state = store.state.lock().unwrap();
    let record = state.cache.get("37.87,32.48").unwrap();
    assert_eq!(record.bundle, fresh);
    assert_eq!(record.updated_at, now);
}

#[tokio::test]
async fn test_cache_write_failure_is_ignored() {
    let store = FakeStore::new();
    store.state.lock().unwrap().fail_cache_writes = true;
    let provider = FakeProvider::ok(bundle(vec![]));

    let weather = service(store, provider);
    assert!(weather.forecast_for(konya(), at(2024, 6, 10, 12, 0)).await.is_ok());
}

#[tokio::test]
async fn test_fetch_failure_is_error() {
    let weather = service(FakeStore::new(), FakeProvider::failing());
    assert!(weather.forecast_for(konya(), at(2024, 6, 10, 12, 0)).await.is_err());
}

// ============================================================================
// Summaries and day slices
// ============================================================================

#[test]
fn test_summary_over_whole_window() {
    let mut samples = day_samples(date(2024, 6, 10), 20.0, 40.0, 1.0);
    samples.extend(day_samples(date(2024, 6, 11), 30.0, 60.0, 0.5));

    let summary = irrigation_planner::services::weather::summarize(&samples);
    assert_eq!(summary.avg_temperature_celsius, 25.0);
    assert_eq!(summary.avg_humidity_percent, 50.0);
    assert_eq!(summary.total_precipitation_mm, 12.0);

    assert_eq!(
        irrigation_planner::services::weather::summarize(&[]),
        ForecastSummary::DEFAULT
    );
}

#[test]
fn test_day_slice_uses_local_date() {
    let day = date(2024, 6, 10);
    // Samples at 00:00..21:00 UTC; at UTC+3 the last sample belongs to the next day
    let mut forecast = bundle(day_samples(day, 20.0, 50.0, 0.0));
    forecast.timezone_offset_seconds = 3 * 3600;

    let today = irrigation_planner::services::weather::day_slice(&forecast, day).unwrap();
    let tomorrow =
        irrigation_planner::services::weather::day_slice(&forecast, date(2024, 6, 11)).unwrap();

    assert_eq!(today.temperature_celsius, 20.0);
    assert_eq!(tomorrow.temperature_celsius, 20.0);
    assert!(irrigation_planner::services::weather::day_slice(&forecast, date(2024, 6, 12)).is_none());
}
