//! Weather API client for fetching forecasts
//!
//! Integrates with the OpenWeatherMap 5-day / 3-hour forecast endpoint

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use shared::{ForecastBundle, ForecastSample, GpsCoordinates, DEFAULT_CONDITION};

use crate::error::{AppError, AppResult};

/// Source of multi-day forecasts for a location
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn fetch_forecast(&self, coordinates: GpsCoordinates) -> AppResult<ForecastBundle>;
}

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    city: OWMCity,
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMCity {
    #[serde(default)]
    name: String,
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    #[serde(default)]
    weather: Vec<OWMWeather>,
    rain: Option<OWMForecastRain>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastRain {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.openweathermap.org/data/2.5".to_string())
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the 5-day / 3-hour forecast by GPS coordinates
    pub async fn get_forecast(&self, coordinates: GpsCoordinates) -> AppResult<ForecastBundle> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=metric",
            self.base_url, coordinates.latitude, coordinates.longitude, self.api_key
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Weather API request failed");
            AppError::WeatherServiceUnavailable
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        let data: OWMForecastResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse forecast response: {}", e))
        })?;

        Ok(convert_forecast_response(data))
    }
}

#[async_trait]
impl ForecastProvider for WeatherClient {
    async fn fetch_forecast(&self, coordinates: GpsCoordinates) -> AppResult<ForecastBundle> {
        self.get_forecast(coordinates).await
    }
}

/// Convert OpenWeatherMap forecast response to our format.
///
/// Samples without a rain block count as dry; samples without a description
/// are reported as clear. Samples with an out-of-range timestamp are dropped.
fn convert_forecast_response(data: OWMForecastResponse) -> ForecastBundle {
    let samples = data
        .list
        .into_iter()
        .filter_map(|item| {
            let Some(timestamp) = DateTime::from_timestamp(item.dt, 0) else {
                tracing::warn!(dt = item.dt, "Dropping forecast sample with invalid timestamp");
                return None;
            };

            Some(ForecastSample {
                timestamp,
                temperature_celsius: item.main.temp,
                humidity_percent: item.main.humidity,
                rain_3h_mm: item.rain.and_then(|r| r.three_hour).unwrap_or(0.0),
                condition: item
                    .weather
                    .into_iter()
                    .next()
                    .and_then(|w| w.description)
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
            })
        })
        .collect();

    ForecastBundle {
        location_name: data.city.name,
        timezone_offset_seconds: data.city.timezone,
        samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_forecast_defaults_missing_rain_and_description() {
        let json = r#"{
            "city": { "name": "Konya", "timezone": 10800 },
            "list": [
                {
                    "dt": 1718013600,
                    "main": { "temp": 31.5, "humidity": 22 },
                    "weather": [{ "main": "Rain", "description": "light rain" }],
                    "rain": { "3h": 1.25 }
                },
                {
                    "dt": 1718024400,
                    "main": { "temp": 29.0, "humidity": 30 },
                    "weather": []
                }
            ]
        }"#;

        let data: OWMForecastResponse = serde_json::from_str(json).unwrap();
        let bundle = convert_forecast_response(data);

        assert_eq!(bundle.location_name, "Konya");
        assert_eq!(bundle.timezone_offset_seconds, 10800);
        assert_eq!(bundle.samples.len(), 2);
        assert_eq!(bundle.samples[0].rain_3h_mm, 1.25);
        assert_eq!(bundle.samples[0].condition, "light rain");
        assert_eq!(bundle.samples[1].rain_3h_mm, 0.0);
        assert_eq!(bundle.samples[1].condition, "clear");
        assert_eq!(bundle.samples[1].humidity_percent, 30.0);
    }

    #[test]
    fn test_convert_forecast_drops_samples_with_invalid_timestamp() {
        let json = r#"{
            "city": { "name": "Konya", "timezone": 10800 },
            "list": [
                {
                    "dt": 9223372036854775807,
                    "main": { "temp": 31.5, "humidity": 22 },
                    "weather": []
                },
                {
                    "dt": 1718024400,
                    "main": { "temp": 29.0, "humidity": 30 },
                    "weather": []
                }
            ]
        }"#;

        let data: OWMForecastResponse = serde_json::from_str(json).unwrap();
        let bundle = convert_forecast_response(data);

        assert_eq!(bundle.samples.len(), 1);
        assert_eq!(bundle.samples[0].timestamp.timestamp(), 1718024400);
        assert_eq!(bundle.samples[0].temperature_celsius, 29.0);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = WeatherClient::with_base_url("key".into(), "http://localhost:9000/".into());
        assert_eq!(client.base_url, "http://localhost:9000");
    }
}
