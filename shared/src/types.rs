//! Common types used across the platform

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Key used by the weather cache, formatted as `"lat,lon"`
    pub fn location_key(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Parse a `"lat,lon"` cache key.
    ///
    /// Returns `None` when either half is missing or not a number.
    pub fn from_location_key(key: &str) -> Option<Self> {
        let (lat, lon) = key.split_once(',')?;
        let (lat, lon) = (lat.trim(), lon.trim());
        if lat.is_empty() || lon.is_empty() {
            return None;
        }

        Some(Self::new(
            Decimal::from_str(lat).ok()?,
            Decimal::from_str(lon).ok()?,
        ))
    }
}

/// A daily watering window such as `06:00-08:00`
///
/// Stored as minutes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
    start_minute: u16,
    end_minute: u16,
}

impl TimeWindow {
    pub const fn from_hm(start: (u16, u16), end: (u16, u16)) -> Self {
        Self {
            start_minute: start.0 * 60 + start.1,
            end_minute: end.0 * 60 + end.1,
        }
    }

    pub fn start(&self) -> NaiveTime {
        minute_to_time(self.start_minute)
    }
}

fn minute_to_time(minute: u16) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(u32::from(minute) * 60, 0)
        .unwrap_or(NaiveTime::MIN)
}

fn parse_clock(part: &str) -> Option<u16> {
    let part = part.trim();
    if part.len() != 5 || part.as_bytes()[2] != b':' {
        return None;
    }
    let time = NaiveTime::parse_from_str(part, "%H:%M").ok()?;
    u16::try_from(time.hour() * 60 + time.minute()).ok()
}

impl FromStr for TimeWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::TimeWindow(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start_minute = parse_clock(start).ok_or_else(invalid)?;
        let end_minute = parse_clock(end).ok_or_else(invalid)?;

        // Windows never span midnight
        if start_minute >= end_minute {
            return Err(invalid());
        }

        Ok(Self {
            start_minute,
            end_minute,
        })
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_key_round_trip() {
        let coords = GpsCoordinates::new(Decimal::new(399334, 4), Decimal::new(328597, 4));
        assert_eq!(coords.location_key(), "39.9334,32.8597");
        assert_eq!(
            GpsCoordinates::from_location_key(" 39.9334 , 32.8597 "),
            Some(coords)
        );
    }

    #[test]
    fn test_malformed_location_key() {
        assert_eq!(GpsCoordinates::from_location_key("39.9"), None);
        assert_eq!(GpsCoordinates::from_location_key("39.9,"), None);
        assert_eq!(GpsCoordinates::from_location_key(",32.8"), None);
        assert_eq!(GpsCoordinates::from_location_key("north,east"), None);
    }

    #[test]
    fn test_time_window_parsing() {
        let window: TimeWindow = "05:30-07:00".parse().unwrap();
        assert_eq!(window, TimeWindow::from_hm((5, 30), (7, 0)));
        assert_eq!(window.to_string(), "05:30-07:00");

        assert!("5:30-07:00".parse::<TimeWindow>().is_err());
        assert!("05:30".parse::<TimeWindow>().is_err());
        assert!("early morning".parse::<TimeWindow>().is_err());
        assert!("25:00-26:00".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn test_inverted_or_empty_time_window_rejected() {
        assert!("20:00-06:00".parse::<TimeWindow>().is_err());
        assert!("06:00-06:00".parse::<TimeWindow>().is_err());
        assert!("23:00-23:59".parse::<TimeWindow>().is_ok());
    }

    #[test]
    fn test_time_window_serializes_as_string() {
        let window = TimeWindow::from_hm((6, 0), (8, 0));
        assert_eq!(serde_json::to_string(&window).unwrap(), "\"06:00-08:00\"");

        let parsed: TimeWindow = serde_json::from_str("\"04:30-06:30\"").unwrap();
        assert_eq!(parsed, TimeWindow::from_hm((4, 30), (6, 30)));
        assert!(serde_json::from_str::<TimeWindow>("\"later\"").is_err());
    }
}
