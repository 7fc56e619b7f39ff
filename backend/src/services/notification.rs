//! Notification service for irrigation reminders and weather warnings
//!
//! Notifications are stored in the `notifications` table with the time they
//! should be delivered; delivery itself happens outside this service.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::IrrigationScheduleEntry;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Notification category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    IrrigationReminder,
    WeatherWarning,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::IrrigationReminder => "irrigation_reminder",
            NotificationCategory::WeatherWarning => "weather_warning",
        }
    }
}

/// A notification to emit for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub user_id: Uuid,
    pub category: NotificationCategory,
    pub title: String,
    pub body: String,
    pub scheduled_for: DateTime<Utc>,
}

/// Notification collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, request: NotificationRequest) -> AppResult<()>;
}

/// Notification service backed by PostgreSQL
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Notifier for NotificationService {
    async fn notify(&self, request: NotificationRequest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, category, title, body, scheduled_for)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.category.as_str())
        .bind(&request.title)
        .bind(&request.body)
        .bind(request.scheduled_for)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Notification Builders
// ============================================================================

/// Reminder for one planned irrigation, due at the start of its window.
///
/// The window is in the field's local time, `utc_offset_seconds` east of UTC.
pub fn create_irrigation_reminder(
    user_id: Uuid,
    field_name: &str,
    entry: &IrrigationScheduleEntry,
    utc_offset_seconds: i32,
) -> NotificationRequest {
    let local_start = entry.date.and_time(entry.recommended_time.start());

    NotificationRequest {
        user_id,
        category: NotificationCategory::IrrigationReminder,
        title: format!("Irrigation reminder: {}", field_name),
        body: format!(
            "Irrigate {} on {} between {}: {} L/m²",
            field_name,
            entry.date.format("%d.%m.%Y"),
            entry.recommended_time,
            entry.water_amount
        ),
        scheduled_for: (local_start - Duration::seconds(i64::from(utc_offset_seconds))).and_utc(),
    }
}

/// Warning for a day on which heavy rain replaces irrigation
pub fn create_weather_warning(
    user_id: Uuid,
    field_name: &str,
    date: NaiveDate,
    message: &str,
    now: DateTime<Utc>,
) -> NotificationRequest {
    NotificationRequest {
        user_id,
        category: NotificationCategory::WeatherWarning,
        title: format!("Weather warning: {}", field_name),
        body: format!("{}: {}", date.format("%d.%m.%Y"), message),
        scheduled_for: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use shared::{ScheduleStatus, TimeWindow};

    fn entry() -> IrrigationScheduleEntry {
        IrrigationScheduleEntry {
            id: Uuid::new_v4(),
            field_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            recommended_time: TimeWindow::from_hm((4, 30), (6, 30)),
            water_amount: Decimal::new(152, 1),
            weather_temp: Decimal::new(350, 1),
            weather_humidity: Decimal::new(600, 1),
            weather_condition: "clear".to_string(),
            note: None,
            status: ScheduleStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reminder_scheduled_at_window_start() {
        let user_id = Uuid::new_v4();
        let reminder = create_irrigation_reminder(user_id, "North plot", &entry(), 0);

        assert_eq!(reminder.category, NotificationCategory::IrrigationReminder);
        assert_eq!(reminder.user_id, user_id);
        assert_eq!(
            reminder.scheduled_for,
            Utc.with_ymd_and_hms(2024, 6, 10, 4, 30, 0).unwrap()
        );
        assert!(reminder.body.contains("10.06.2024"));
        assert!(reminder.body.contains("04:30-06:30"));
        assert!(reminder.body.contains("15.2"));
    }

    #[test]
    fn test_reminder_uses_field_local_time() {
        // 04:30 at UTC+3 is 01:30 UTC
        let reminder = create_irrigation_reminder(Uuid::nil(), "North plot", &entry(), 3 * 3600);
        assert_eq!(
            reminder.scheduled_for,
            Utc.with_ymd_and_hms(2024, 6, 10, 1, 30, 0).unwrap()
        );
        assert!(reminder.body.contains("04:30-06:30"));

        // West of UTC the reminder can land on the next UTC day
        let mut late = entry();
        late.recommended_time = TimeWindow::from_hm((21, 0), (23, 0));
        let reminder = create_irrigation_reminder(Uuid::nil(), "North plot", &late, -5 * 3600);
        assert_eq!(
            reminder.scheduled_for,
            Utc.with_ymd_and_hms(2024, 6, 11, 2, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_weather_warning() {
        let now = Utc.with_ymd_and_hms(2024, 6, 9, 12, 0, 0).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let warning = create_weather_warning(Uuid::nil(), "North plot", date, "Heavy rain", now);

        assert_eq!(warning.category, NotificationCategory::WeatherWarning);
        assert_eq!(warning.scheduled_for, now);
        assert_eq!(warning.body, "12.06.2024: Heavy rain");
        assert_eq!(NotificationCategory::WeatherWarning.as_str(), "weather_warning");
    }
}
