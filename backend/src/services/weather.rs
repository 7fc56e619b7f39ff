//! Weather service: cached forecast lookup, fresh fetches and summaries

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use shared::{DayWeather, ForecastBundle, ForecastSample, ForecastSummary, GpsCoordinates};

use crate::error::AppResult;
use crate::external::ForecastProvider;
use crate::services::store::IrrigationStore;

/// Result of a forecast cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// A bundle refreshed within the cache TTL
    Hit(ForecastBundle),
    /// Absent, stale, unreadable or malformed key
    Miss,
}

impl CacheLookup {
    pub fn into_bundle(self) -> Option<ForecastBundle> {
        match self {
            CacheLookup::Hit(bundle) => Some(bundle),
            CacheLookup::Miss => None,
        }
    }
}

/// Weather service for forecasts and the forecast cache
#[derive(Clone)]
pub struct WeatherService {
    store: Arc<dyn IrrigationStore>,
    provider: Arc<dyn ForecastProvider>,
    cache_ttl: Duration,
}

impl WeatherService {
    /// Create a new WeatherService instance
    pub fn new(
        store: Arc<dyn IrrigationStore>,
        provider: Arc<dyn ForecastProvider>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            provider,
            cache_ttl,
        }
    }

    /// Look up a cached bundle by `"lat,lon"` key.
    ///
    /// Bundles older than the TTL, unparseable keys and store errors all
    /// count as a miss.
    pub async fn lookup_cached(&self, location_key: &str, now: DateTime<Utc>) -> CacheLookup {
        let Some(coordinates) = GpsCoordinates::from_location_key(location_key) else {
            tracing::debug!(location_key, "Malformed location key");
            return CacheLookup::Miss;
        };

        let record = match self.store.get_weather_cache(&coordinates.location_key()).await {
            Ok(Some(record)) => record,
            Ok(None) => return CacheLookup::Miss,
            Err(e) => {
                tracing::warn!(location_key, error = %e, "Weather cache read failed");
                return CacheLookup::Miss;
            }
        };

        if now - record.updated_at > self.cache_ttl {
            tracing::debug!(location_key, updated_at = %record.updated_at, "Weather cache entry stale");
            return CacheLookup::Miss;
        }

        CacheLookup::Hit(record.bundle)
    }

    /// Fetch a fresh bundle from the provider and refresh the cache.
    ///
    /// A failed cache write is logged and ignored.
    pub async fn fetch_fresh(
        &self,
        coordinates: GpsCoordinates,
        now: DateTime<Utc>,
    ) -> AppResult<ForecastBundle> {
        let bundle = self.provider.fetch_forecast(coordinates).await?;

        let key = coordinates.location_key();
        if let Err(e) = self.store.put_weather_cache(&key, &bundle, now).await {
            tracing::warn!(location_key = %key, error = %e, "Failed to cache forecast");
        }

        Ok(bundle)
    }

    /// Cached bundle when fresh, otherwise a new fetch
    pub async fn forecast_for(
        &self,
        coordinates: GpsCoordinates,
        now: DateTime<Utc>,
    ) -> AppResult<ForecastBundle> {
        if let CacheLookup::Hit(bundle) = self.lookup_cached(&coordinates.location_key(), now).await
        {
            return Ok(bundle);
        }

        self.fetch_fresh(coordinates, now).await
    }
}

/// Averages and rain total over the whole forecast window
pub fn summarize(samples: &[ForecastSample]) -> ForecastSummary {
    ForecastSummary::from_samples(samples)
}

/// Weather of the samples falling on `date` in the forecast's local time
pub fn day_slice(bundle: &ForecastBundle, date: NaiveDate) -> Option<DayWeather> {
    bundle.day_weather(date)
}
