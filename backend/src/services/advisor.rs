//! Water-need advisor backed by a text-generation service
//!
//! The advisor asks for a refined water profile, pulls the first JSON object
//! out of the free-text reply and clamps the numbers to safe ranges. It never
//! fails: every problem becomes [`Advice::NoAdvice`] and the caller keeps the
//! reference profile.

use std::sync::Arc;

use serde_json::Value;
use shared::{AiWaterProfile, ForecastSummary, GpsCoordinates, TimeWindow};
use thiserror::Error;

use crate::external::TextGenerator;

/// Why no advice was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoAdviceReason {
    /// No credential configured for the provider
    NotConfigured,
    /// Transport or server error from the provider
    ProviderError,
    /// Reply without a usable JSON object
    Malformed,
}

/// Advisor outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Advice {
    Profile(AiWaterProfile),
    NoAdvice(NoAdviceReason),
}

impl Advice {
    pub fn profile(&self) -> Option<&AiWaterProfile> {
        match self {
            Advice::Profile(profile) => Some(profile),
            Advice::NoAdvice(_) => None,
        }
    }
}

/// Reply did not contain a usable JSON object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed advisor response: {0}")]
pub struct MalformedResponse(pub &'static str);

/// Inputs describing the field and the season for one request
#[derive(Debug, Clone)]
pub struct AdviceRequest<'a> {
    pub crop_type: &'a str,
    pub soil_type: &'a str,
    pub coordinates: GpsCoordinates,
    pub month: u32,
    pub summary: ForecastSummary,
}

/// Water-need advisor
#[derive(Clone)]
pub struct ProfileAdvisor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl ProfileAdvisor {
    /// `None` disables the advisor
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn disabled() -> Self {
        Self { generator: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Request a refined water profile
    pub async fn advise(&self, request: &AdviceRequest<'_>) -> Advice {
        let Some(generator) = &self.generator else {
            return Advice::NoAdvice(NoAdviceReason::NotConfigured);
        };

        let reply = match generator.complete(&build_prompt(request)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(crop = request.crop_type, error = %e, "Advisor request failed");
                return Advice::NoAdvice(NoAdviceReason::ProviderError);
            }
        };

        match parse_advice(&reply) {
            Ok(profile) => Advice::Profile(profile),
            Err(e) => {
                tracing::warn!(crop = request.crop_type, error = %e, "Advisor reply unusable");
                Advice::NoAdvice(NoAdviceReason::Malformed)
            }
        }
    }
}

/// Prompt for one advice request
pub fn build_prompt(request: &AdviceRequest<'_>) -> String {
    let summary = &request.summary;
    format!(
        "You are an agronomist planning irrigation.\n\
         Crop: {crop}\n\
         Soil: {soil}\n\
         Location: {lat}, {lon}\n\
         Month: {month}\n\
         Forecast: average temperature {temp:.1} °C, average humidity {hum:.0}%, \
         total precipitation {rain:.1} mm.\n\
         Estimate the daily water need in L/m² and how often to irrigate.\n\
         Reply with a single JSON object only, for example:\n\
         {{\"waterMin\": 4.5, \"waterMax\": 7.0, \"intervalDays\": 3, \
         \"recommendedTimeRange\": \"06:00-08:00\"}}",
        crop = request.crop_type,
        soil = request.soil_type,
        lat = request.coordinates.latitude,
        lon = request.coordinates.longitude,
        month = request.month,
        temp = summary.avg_temperature_celsius,
        hum = summary.avg_humidity_percent,
        rain = summary.total_precipitation_mm,
    )
}

/// First JSON object embedded anywhere in `text`
pub fn extract_json_object(text: &str) -> Result<Value, MalformedResponse> {
    for (start, _) in text.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(value @ Value::Object(_))) = values.next() {
            return Ok(value);
        }
    }
    Err(MalformedResponse("no JSON object found"))
}

/// Parse and clamp an advisor reply
pub fn parse_advice(text: &str) -> Result<AiWaterProfile, MalformedResponse> {
    let object = extract_json_object(text)?;

    let water_min = number_field(&object, "waterMin")?;
    let water_max = number_field(&object, "waterMax")?;
    let interval_days = number_field(&object, "intervalDays")?;

    // An unusable window falls back to the temperature-banded default.
    let window = object
        .get("recommendedTimeRange")
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse::<TimeWindow>().ok());

    AiWaterProfile::clamped(water_min, water_max, interval_days, window)
        .ok_or(MalformedResponse("non-finite number"))
}

fn number_field(object: &Value, key: &'static str) -> Result<f64, MalformedResponse> {
    let value = match object.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    value
        .filter(|v| v.is_finite())
        .ok_or(MalformedResponse("missing or non-numeric field"))
}
