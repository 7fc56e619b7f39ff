//! Validation utilities for the Irrigation Planner

use rust_decimal::Decimal;
use thiserror::Error;

/// Safety bounds for the AI-suggested minimum water need (L/m²/day)
pub const AI_WATER_MIN_BOUNDS: (f64, f64) = (0.5, 12.0);

/// Safety bounds for the AI-suggested maximum water need (L/m²/day)
pub const AI_WATER_MAX_BOUNDS: (f64, f64) = (0.8, 15.0);

/// Safety bounds for the AI-suggested irrigation interval (days)
pub const AI_INTERVAL_BOUNDS: (u32, u32) = (1, 10);

/// Validation errors for domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid time window '{0}', expected HH:MM-HH:MM")]
    TimeWindow(String),

    #[error("Invalid schedule status '{0}'")]
    Status(String),
}

// ============================================================================
// Location Validations
// ============================================================================

/// Validate latitude/longitude are within WGS84 ranges
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

// ============================================================================
// Name Validations
// ============================================================================

/// Validate a crop or soil display name
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    if name.chars().count() > 100 {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}
