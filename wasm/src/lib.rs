//! WebAssembly module for the Irrigation Planner
//!
//! Provides client-side previews for:
//! - Crop and soil name normalization
//! - Per-day water amounts for both planners
//! - Watering window selection and validation

use std::sync::OnceLock;

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{
    assisted_water_amount, default_time_window, normalize_key, plan_basic_day, round_to_tenth,
    DayWeather, ReferenceTables,
};

fn tables() -> &'static ReferenceTables {
    static TABLES: OnceLock<ReferenceTables> = OnceLock::new();
    TABLES.get_or_init(ReferenceTables::builtin)
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("irrigation planner preview ready"));
}

/// Canonical lookup key for a crop or soil name
#[wasm_bindgen]
pub fn normalize_name(name: &str) -> String {
    normalize_key(name)
}

/// Whether the crop has its own reference profile
#[wasm_bindgen]
pub fn is_known_crop(name: &str) -> bool {
    tables().is_known_crop(name)
}

/// Keys of all crops with a reference profile
#[wasm_bindgen]
pub fn known_crops() -> js_sys::Array {
    let mut keys: Vec<&str> = tables().crops().map(|(key, _)| key).collect();
    keys.sort_unstable();
    keys.into_iter().map(JsValue::from_str).collect()
}

/// Reference profile of a crop as JSON
#[wasm_bindgen]
pub fn crop_profile_json(name: &str) -> Result<String, JsValue> {
    serde_json::to_string(&tables().crop_profile(name))
        .map_err(|e| JsValue::from_str(&format!("Failed to encode profile: {}", e)))
}

/// Assisted water amount (L/m²) for one day, without AI adjustments.
///
/// Months outside 1–12 get no seasonal adjustment.
#[wasm_bindgen]
pub fn preview_assisted_water(
    crop: &str,
    soil: &str,
    temperature: f64,
    humidity: f64,
    rain_mm: f64,
    month: u32,
) -> f64 {
    let profile = tables().crop_profile(crop);
    let weather = DayWeather::new(temperature, humidity, rain_mm);
    let amount = assisted_water_amount(
        &profile,
        tables().soil_multiplier(soil),
        &weather,
        month,
    );
    round_to_tenth(amount.max(0.0))
}

/// Basic-planner water amount (L/m²) for one day
#[wasm_bindgen]
pub fn preview_basic_water(crop: &str, soil: &str, temperature: f64, humidity: f64, rain_mm: f64) -> f64 {
    let day = plan_basic_day(
        NaiveDate::MIN,
        tables().base_water_need(crop),
        &tables().resolve(soil),
        DayWeather::new(temperature, humidity, rain_mm),
    );
    day.water_amount
}

/// Watering window suggested for a day's average temperature
#[wasm_bindgen]
pub fn recommended_time_window(temperature: f64) -> String {
    default_time_window(temperature).to_string()
}

/// Whether `value` is a valid `HH:MM-HH:MM` window
#[wasm_bindgen]
pub fn is_valid_time_window(value: &str) -> bool {
    value.parse::<TimeWindow>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Şeker  Pancarı "), "seker pancari");
        assert!(is_known_crop("Domates"));
        assert!(!is_known_crop("quinoa"));
    }

    #[test]
    fn test_preview_assisted_water() {
        // Tomato, sandy soil, 35 °C, June
        assert_eq!(preview_assisted_water("tomato", "sandy", 35.0, 60.0, 0.0, 6), 15.2);
        assert_eq!(preview_assisted_water("tomato", "sandy", 35.0, 60.0, 16.0, 6), 0.0);
        // Wheat at its optimum in May
        assert_eq!(preview_assisted_water("wheat", "loam", 20.0, 50.0, 0.0, 5), 4.5);
    }

    #[test]
    fn test_preview_basic_water() {
        assert_eq!(preview_basic_water("quinoa", "loam", 20.0, 50.0, 0.0), 5.0);
        assert_eq!(preview_basic_water("quinoa", "loam", 20.0, 50.0, 6.0), 0.0);
        assert_eq!(preview_basic_water("tomato", "Kumlu", 32.0, 35.0, 0.0), 11.2);
    }

    #[test]
    fn test_time_windows() {
        assert_eq!(recommended_time_window(31.0), "04:30-06:30");
        assert_eq!(recommended_time_window(10.0), "10:00-12:00");
        assert!(is_valid_time_window("06:00-08:00"));
        assert!(!is_valid_time_window("6-8"));
    }

    #[test]
    fn test_crop_profile_json() {
        let json = crop_profile_json("Domates").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["water_min"], 5.0);
        assert_eq!(value["water_max"], 8.0);
    }
}
