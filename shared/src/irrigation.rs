//! Per-day irrigation calculations
//!
//! Two planners share this module:
//!
//! - the **assisted** planner scales the midpoint of a crop's water bounds by
//!   temperature, humidity, soil, rain and season factors and plans every
//!   `interval` days over a 14-day horizon;
//! - the **basic** planner starts from the crop's base daily need, applies a
//!   smaller set of banded adjustments and plans each of the next 7 days.
//!
//! Everything here is pure; fetching forecasts, persisting entries and
//! notifying users live in the backend.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CropProfile, DayWeather, ScheduleNote, CLAY_SOIL, SANDY_SOIL};
use crate::types::TimeWindow;

/// Days covered by the assisted planner
pub const ASSISTED_HORIZON_DAYS: u32 = 14;

/// Days covered by the basic planner
pub const BASIC_HORIZON_DAYS: u32 = 7;

/// 3-hour forecast samples per day
pub const SAMPLES_PER_DAY: usize = 8;

/// Weather assumed by the basic planner when a day has no forecast sample
pub const BASIC_DEFAULT_TEMPERATURE: f64 = 25.0;
pub const BASIC_DEFAULT_HUMIDITY: f64 = 50.0;

/// Outcome of planning a single day, before it becomes a schedule entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyIrrigation {
    pub date: NaiveDate,
    /// L/m², non-negative and rounded to 0.1
    pub water_amount: f64,
    pub window: TimeWindow,
    pub note: Option<ScheduleNote>,
    pub weather: DayWeather,
}

// ============================================================================
// Assisted planner
// ============================================================================

/// Day offsets `0, interval, 2·interval, …` below `horizon_days`
pub fn assisted_day_offsets(interval_days: u32, horizon_days: u32) -> impl Iterator<Item = u32> {
    (0..horizon_days).step_by(interval_days.max(1) as usize)
}

/// Temperature adjustment around the crop optimum.
///
/// Heat raises the factor by up to 50% (1 per 10 °C), cold lowers it by up to
/// 30% (1 per 20 °C).
pub fn temperature_factor(temperature: f64, optimal: f64) -> f64 {
    let delta = temperature - optimal;
    if delta > 0.0 {
        1.0 + (delta / 10.0).min(0.5)
    } else if delta < 0.0 {
        1.0 - (delta.abs() / 20.0).min(0.3)
    } else {
        1.0
    }
}

/// Humidity adjustment around the crop optimum.
///
/// Dry air raises the factor by up to 40%, humid air lowers it by up to 20%.
pub fn humidity_factor(humidity: f64, optimal: f64) -> f64 {
    let delta = optimal - humidity;
    if delta > 0.0 {
        1.0 + (delta / 100.0).min(0.4)
    } else if delta < 0.0 {
        1.0 - (delta.abs() / 150.0).min(0.2)
    } else {
        1.0
    }
}

/// Dampening applied for the day's total rain, most severe band first
pub fn rain_factor(rain_mm: f64) -> f64 {
    if rain_mm > 15.0 {
        0.0
    } else if rain_mm > 10.0 {
        0.2
    } else if rain_mm > 5.0 {
        0.5
    } else if rain_mm > 2.0 {
        0.7
    } else {
        1.0
    }
}

/// Northern-hemisphere season factor for a calendar month (1–12)
pub fn season_factor(month: u32) -> f64 {
    match month {
        6..=9 => 1.2,
        12 | 1..=3 => 0.8,
        _ => 1.0,
    }
}

/// Default watering window: earlier on hotter days
pub fn default_time_window(temperature: f64) -> TimeWindow {
    if temperature > 30.0 {
        TimeWindow::from_hm((4, 30), (6, 30))
    } else if temperature > 28.0 {
        TimeWindow::from_hm((5, 0), (7, 0))
    } else if temperature > 24.0 {
        TimeWindow::from_hm((6, 0), (8, 0))
    } else if temperature > 18.0 {
        TimeWindow::from_hm((7, 0), (9, 0))
    } else if temperature < 12.0 {
        TimeWindow::from_hm((10, 0), (12, 0))
    } else {
        TimeWindow::from_hm((8, 0), (10, 0))
    }
}

/// First matching explanation for an assisted day
pub fn assisted_note(weather: &DayWeather, profile: &CropProfile) -> Option<ScheduleNote> {
    if weather.rain_mm > 15.0 {
        Some(ScheduleNote::HeavyRain)
    } else if weather.rain_mm > 5.0 {
        Some(ScheduleNote::RainReduced)
    } else if weather.temperature_celsius > profile.temp_optimal + 5.0 {
        Some(ScheduleNote::HighTemperature)
    } else if weather.humidity_percent < profile.humidity_optimal - 20.0 {
        Some(ScheduleNote::LowHumidity)
    } else if weather.temperature_celsius < profile.temp_optimal - 8.0 {
        Some(ScheduleNote::LowTemperature)
    } else {
        None
    }
}

/// Unrounded assisted water amount for a day
pub fn assisted_water_amount(
    profile: &CropProfile,
    soil_multiplier: f64,
    weather: &DayWeather,
    month: u32,
) -> f64 {
    let amount = profile.base_water()
        * temperature_factor(weather.temperature_celsius, profile.temp_optimal)
        * humidity_factor(weather.humidity_percent, profile.humidity_optimal)
        * soil_multiplier;

    amount * rain_factor(weather.rain_mm) * season_factor(month)
}

/// Plan one assisted day.
///
/// `profile` is the effective profile (reference profile with any AI water
/// bounds merged in); `window` is the AI-suggested watering window, if any.
pub fn plan_assisted_day(
    date: NaiveDate,
    profile: &CropProfile,
    soil_multiplier: f64,
    weather: DayWeather,
    window: Option<TimeWindow>,
) -> DailyIrrigation {
    let amount = assisted_water_amount(profile, soil_multiplier, &weather, date.month());

    DailyIrrigation {
        date,
        water_amount: round_to_tenth(amount.max(0.0)),
        window: window.unwrap_or_else(|| default_time_window(weather.temperature_celsius)),
        note: assisted_note(&weather, profile),
        weather,
    }
}

/// Weather assumed for an assisted day without forecast samples
pub fn assisted_default_weather(profile: &CropProfile) -> DayWeather {
    DayWeather::new(profile.temp_optimal, profile.humidity_optimal, 0.0)
}

// ============================================================================
// Basic planner
// ============================================================================

/// Index of the forecast sample used for day `day` (same time next day)
pub fn basic_sample_index(day: u32) -> usize {
    day as usize * SAMPLES_PER_DAY
}

/// Weather assumed for a basic day without a forecast sample
pub fn basic_default_weather() -> DayWeather {
    DayWeather::new(BASIC_DEFAULT_TEMPERATURE, BASIC_DEFAULT_HUMIDITY, 0.0)
}

/// Plan one basic day from the crop's base need and the resolved soil key
pub fn plan_basic_day(
    date: NaiveDate,
    base_water_need: f64,
    soil_key: &str,
    weather: DayWeather,
) -> DailyIrrigation {
    let temperature = weather.temperature_celsius;
    let humidity = weather.humidity_percent;
    let mut amount = base_water_need;

    if temperature > 30.0 {
        amount *= 1.3;
    } else if temperature > 25.0 {
        amount *= 1.1;
    } else if temperature < 15.0 {
        amount *= 0.8;
    }

    if humidity < 40.0 {
        amount *= 1.2;
    } else if humidity > 70.0 {
        amount *= 0.8;
    }

    if soil_key == SANDY_SOIL {
        amount *= 1.2;
    } else if soil_key == CLAY_SOIL {
        amount *= 0.9;
    }

    let mut note = None;
    if weather.rain_mm > 5.0 {
        amount = 0.0;
        note = Some(ScheduleNote::RainSkipped);
    }

    let window = if temperature > 28.0 {
        TimeWindow::from_hm((6, 0), (8, 0))
    } else {
        TimeWindow::from_hm((7, 0), (9, 0))
    };

    DailyIrrigation {
        date,
        water_amount: round_to_tenth(amount.max(0.0)),
        window,
        note,
        weather,
    }
}

// ============================================================================
// Rounding
// ============================================================================

/// Round half away from zero to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convert to a one-decimal `Decimal` for persistence
pub fn tenth_decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(round_to_tenth(value))
        .map(|d| d.round_dp(1))
        .unwrap_or_default()
}
