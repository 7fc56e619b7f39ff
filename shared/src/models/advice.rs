//! AI-suggested water profile

use serde::{Deserialize, Serialize};

use crate::models::CropProfile;
use crate::types::TimeWindow;
use crate::validation::{AI_INTERVAL_BOUNDS, AI_WATER_MAX_BOUNDS, AI_WATER_MIN_BOUNDS};

/// Refined water need suggested by the text-generation advisor.
///
/// Only constructed through [`AiWaterProfile::clamped`], so every value is
/// inside the agronomic safety bounds regardless of what the provider
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiWaterProfile {
    pub water_min: f64,
    pub water_max: f64,
    pub interval_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_time_range: Option<TimeWindow>,
}

impl AiWaterProfile {
    /// Build a profile from raw provider numbers.
    ///
    /// Returns `None` when any number is not finite. Water bounds are clamped
    /// to their safety ranges and the interval is clamped to 1–10 days and
    /// rounded.
    pub fn clamped(
        water_min: f64,
        water_max: f64,
        interval_days: f64,
        recommended_time_range: Option<TimeWindow>,
    ) -> Option<Self> {
        if !(water_min.is_finite() && water_max.is_finite() && interval_days.is_finite()) {
            return None;
        }

        let (min_lo, min_hi) = AI_WATER_MIN_BOUNDS;
        let (max_lo, max_hi) = AI_WATER_MAX_BOUNDS;
        let (interval_lo, interval_hi) = AI_INTERVAL_BOUNDS;

        Some(Self {
            water_min: water_min.clamp(min_lo, min_hi),
            water_max: water_max.clamp(max_lo, max_hi),
            // Bounded to 1..=10 before the cast.
            interval_days: interval_days
                .clamp(f64::from(interval_lo), f64::from(interval_hi))
                .round() as u32,
            recommended_time_range,
        })
    }

    /// Crop profile with this profile's water bounds merged in
    pub fn apply_to(&self, profile: CropProfile) -> CropProfile {
        profile.with_water_bounds(self.water_min, self.water_max)
    }
}
