//! Weather forecast models

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Condition reported for days without forecast data
pub const DEFAULT_CONDITION: &str = "clear";

/// One 3-hour forecast data point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    /// Precipitation over the trailing 3 hours
    pub rain_3h_mm: f64,
    pub condition: String,
}

/// Multi-day forecast for a location, as fetched from the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    pub location_name: String,
    pub timezone_offset_seconds: i32,
    pub samples: Vec<ForecastSample>,
}

impl ForecastBundle {
    /// Calendar date of a sample in the forecast location's local time
    pub fn local_date(&self, sample: &ForecastSample) -> NaiveDate {
        (sample.timestamp + Duration::seconds(i64::from(self.timezone_offset_seconds)))
            .date_naive()
    }

    /// Aggregate weather of all samples falling on `date`.
    ///
    /// Temperature and humidity are averaged, rain is summed and the
    /// condition is the most frequent description (earliest wins ties).
    pub fn day_weather(&self, date: NaiveDate) -> Option<DayWeather> {
        let samples: Vec<&ForecastSample> = self
            .samples
            .iter()
            .filter(|s| self.local_date(s) == date)
            .collect();

        if samples.is_empty() {
            return None;
        }

        let count = samples.len() as f64;
        let mut conditions: Vec<(&str, usize)> = Vec::new();
        for sample in &samples {
            match conditions
                .iter_mut()
                .find(|(c, _)| *c == sample.condition.as_str())
            {
                Some((_, n)) => *n += 1,
                None => conditions.push((sample.condition.as_str(), 1)),
            }
        }
        let condition = conditions
            .iter()
            .fold(None::<(&str, usize)>, |best, &(c, n)| match best {
                Some((_, best_n)) if best_n >= n => best,
                _ => Some((c, n)),
            })
            .map(|(c, _)| c.to_string())
            .unwrap_or_else(|| DEFAULT_CONDITION.to_string());

        Some(DayWeather {
            temperature_celsius: samples.iter().map(|s| s.temperature_celsius).sum::<f64>()
                / count,
            humidity_percent: samples.iter().map(|s| s.humidity_percent).sum::<f64>() / count,
            rain_mm: samples.iter().map(|s| s.rain_3h_mm).sum(),
            condition,
        })
    }

    /// Weather of the single sample at `index`, if present
    pub fn sample_weather(&self, index: usize) -> Option<DayWeather> {
        self.samples.get(index).map(DayWeather::from)
    }
}

/// Aggregate statistics over a forecast window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub avg_temperature_celsius: f64,
    pub avg_humidity_percent: f64,
    pub total_precipitation_mm: f64,
}

impl ForecastSummary {
    /// Summary used when the forecast has no samples
    pub const DEFAULT: Self = Self {
        avg_temperature_celsius: 20.0,
        avg_humidity_percent: 50.0,
        total_precipitation_mm: 0.0,
    };

    pub fn from_samples(samples: &[ForecastSample]) -> Self {
        if samples.is_empty() {
            return Self::DEFAULT;
        }

        let count = samples.len() as f64;
        Self {
            avg_temperature_celsius: samples.iter().map(|s| s.temperature_celsius).sum::<f64>()
                / count,
            avg_humidity_percent: samples.iter().map(|s| s.humidity_percent).sum::<f64>() / count,
            total_precipitation_mm: samples.iter().map(|s| s.rain_3h_mm).sum(),
        }
    }
}

impl Default for ForecastSummary {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Weather used to plan a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayWeather {
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub rain_mm: f64,
    pub condition: String,
}

impl DayWeather {
    pub fn new(temperature_celsius: f64, humidity_percent: f64, rain_mm: f64) -> Self {
        Self {
            temperature_celsius,
            humidity_percent,
            rain_mm,
            condition: DEFAULT_CONDITION.to_string(),
        }
    }
}

impl From<&ForecastSample> for DayWeather {
    fn from(sample: &ForecastSample) -> Self {
        Self {
            temperature_celsius: sample.temperature_celsius,
            humidity_percent: sample.humidity_percent,
            rain_mm: sample.rain_3h_mm,
            condition: sample.condition.clone(),
        }
    }
}
