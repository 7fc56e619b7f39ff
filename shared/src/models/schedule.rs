//! Irrigation schedule models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TimeWindow;
use crate::validation::ValidationError;

/// One day's irrigation recommendation for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationScheduleEntry {
    pub id: Uuid,
    pub field_id: Uuid,
    pub date: NaiveDate,
    pub recommended_time: TimeWindow,
    /// Water to apply (L/m²), rounded to 0.1
    pub water_amount: Decimal,
    pub weather_temp: Decimal,
    pub weather_humidity: Decimal,
    pub weather_condition: String,
    pub note: Option<String>,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle status of a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Pending,
    Completed,
    Skipped,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Pending => "pending",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Skipped => "skipped",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }

    /// Only pending entries may change status
    pub fn can_transition_to(&self, next: ScheduleStatus) -> bool {
        *self == ScheduleStatus::Pending && next != ScheduleStatus::Pending
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ScheduleStatus::Pending),
            "completed" => Ok(ScheduleStatus::Completed),
            "skipped" => Ok(ScheduleStatus::Skipped),
            "cancelled" => Ok(ScheduleStatus::Cancelled),
            other => Err(ValidationError::Status(other.to_string())),
        }
    }
}

/// Explanation attached to a planned day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleNote {
    /// More than 15 mm of rain, no irrigation
    HeavyRain,
    /// More than 5 mm of rain, amount reduced
    RainReduced,
    HighTemperature,
    LowHumidity,
    LowTemperature,
    /// Basic schedule: more than 5 mm of rain, irrigation skipped
    RainSkipped,
}

impl ScheduleNote {
    pub fn message(&self) -> &'static str {
        match self {
            ScheduleNote::HeavyRain => "Heavy rain expected, no irrigation needed",
            ScheduleNote::RainReduced => "Rain expected, water amount reduced",
            ScheduleNote::HighTemperature => "High temperature, more water may be needed",
            ScheduleNote::LowHumidity => "Low humidity, water amount increased",
            ScheduleNote::LowTemperature => "Low temperature, water amount decreased",
            ScheduleNote::RainSkipped => "Rain expected (over 5 mm), irrigation skipped",
        }
    }

    /// Whether this note should raise a weather warning
    pub fn is_heavy_rain(&self) -> bool {
        matches!(self, ScheduleNote::HeavyRain)
    }
}

impl fmt::Display for ScheduleNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Generation tier that produced a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleTier {
    /// Forecast + reference tables + AI advice, 14-day horizon
    Assisted,
    /// Cached/fresh forecast + reference tables, 7-day horizon
    Basic,
    /// Both tiers failed; the schedule is empty
    Unavailable,
}

impl fmt::Display for ScheduleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScheduleTier::Assisted => "assisted",
            ScheduleTier::Basic => "basic",
            ScheduleTier::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// Result of a schedule generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub tier: ScheduleTier,
    pub entries: Vec<IrrigationScheduleEntry>,
}

impl ScheduleOutcome {
    pub fn unavailable() -> Self {
        Self {
            tier: ScheduleTier::Unavailable,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
