//! Persistence for fields, irrigation schedules and the forecast cache

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{Field, ForecastBundle, IrrigationScheduleEntry, ScheduleStatus, TimeWindow};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Cached forecast bundle for a location key
#[derive(Debug, Clone)]
pub struct WeatherCacheRecord {
    pub location_key: String,
    pub bundle: ForecastBundle,
    pub updated_at: DateTime<Utc>,
}

/// Storage collaborator used by the scheduler and the HTTP handlers
#[async_trait]
pub trait IrrigationStore: Send + Sync {
    /// Check that the backing store is reachable
    async fn ping(&self) -> AppResult<()>;

    async fn get_field(&self, field_id: Uuid) -> AppResult<Option<Field>>;

    /// Persist a generated schedule in one transaction.
    ///
    /// Pending rows of the same field on the same dates are replaced.
    async fn insert_schedule(&self, entries: &[IrrigationScheduleEntry]) -> AppResult<()>;

    /// Entries of a field dated on or after `from`, oldest first
    async fn list_schedule(
        &self,
        field_id: Uuid,
        from: NaiveDate,
    ) -> AppResult<Vec<IrrigationScheduleEntry>>;

    /// Move a pending entry to `status`
    async fn update_entry_status(
        &self,
        entry_id: Uuid,
        status: ScheduleStatus,
    ) -> AppResult<IrrigationScheduleEntry>;

    async fn get_weather_cache(&self, location_key: &str) -> AppResult<Option<WeatherCacheRecord>>;

    /// Insert or refresh the cached bundle for `location_key`
    async fn put_weather_cache(
        &self,
        location_key: &str,
        bundle: &ForecastBundle,
        fetched_at: DateTime<Utc>,
    ) -> AppResult<()>;
}

// ============================================================================
// PostgreSQL implementation
// ============================================================================

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgIrrigationStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct FieldRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    crop_type: String,
    soil_type: String,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    area_decares: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FieldRow> for Field {
    fn from(row: FieldRow) -> Self {
        Field {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            crop_type: row.crop_type,
            soil_type: row.soil_type,
            latitude: row.latitude,
            longitude: row.longitude,
            area_decares: row.area_decares,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRow {
    id: Uuid,
    field_id: Uuid,
    date: NaiveDate,
    recommended_time: String,
    water_amount: Decimal,
    weather_temp: Decimal,
    weather_humidity: Decimal,
    weather_condition: String,
    note: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ScheduleRow> for IrrigationScheduleEntry {
    type Error = AppError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        let recommended_time: TimeWindow = row
            .recommended_time
            .parse()
            .map_err(|e| AppError::Internal(format!("Stored schedule row {}: {}", row.id, e)))?;
        let status: ScheduleStatus = row
            .status
            .parse()
            .map_err(|e| AppError::Internal(format!("Stored schedule row {}: {}", row.id, e)))?;

        Ok(IrrigationScheduleEntry {
            id: row.id,
            field_id: row.field_id,
            date: row.date,
            recommended_time,
            water_amount: row.water_amount,
            weather_temp: row.weather_temp,
            weather_humidity: row.weather_humidity,
            weather_condition: row.weather_condition,
            note: row.note,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct WeatherCacheRow {
    location_key: String,
    payload: serde_json::Value,
    updated_at: DateTime<Utc>,
}

const SCHEDULE_COLUMNS: &str = "id, field_id, date, recommended_time, water_amount, weather_temp, \
     weather_humidity, weather_condition, note, status, created_at";

impl PgIrrigationStore {
    /// Create a new PgIrrigationStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn get_entry(&self, entry_id: Uuid) -> AppResult<Option<IrrigationScheduleEntry>> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!(
            "SELECT {} FROM irrigation_schedules WHERE id = $1",
            SCHEDULE_COLUMNS
        ))
        .bind(entry_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(IrrigationScheduleEntry::try_from).transpose()
    }
}

#[async_trait]
impl IrrigationStore for PgIrrigationStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn get_field(&self, field_id: Uuid) -> AppResult<Option<Field>> {
        let row = sqlx::query_as::<_, FieldRow>(
            r#"
            SELECT id, user_id, name, crop_type, soil_type, latitude, longitude,
                   area_decares, created_at, updated_at
            FROM fields
            WHERE id = $1
            "#,
        )
        .bind(field_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Field::from))
    }

    async fn insert_schedule(&self, entries: &[IrrigationScheduleEntry]) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        for entry in entries {
            sqlx::query(
                "DELETE FROM irrigation_schedules WHERE field_id = $1 AND date = $2 AND status = 'pending'",
            )
            .bind(entry.field_id)
            .bind(entry.date)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO irrigation_schedules (
                    id, field_id, date, recommended_time, water_amount, weather_temp,
                    weather_humidity, weather_condition, note, status, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(entry.id)
            .bind(entry.field_id)
            .bind(entry.date)
            .bind(entry.recommended_time.to_string())
            .bind(entry.water_amount)
            .bind(entry.weather_temp)
            .bind(entry.weather_humidity)
            .bind(&entry.weather_condition)
            .bind(&entry.note)
            .bind(entry.status.as_str())
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_schedule(
        &self,
        field_id: Uuid,
        from: NaiveDate,
    ) -> AppResult<Vec<IrrigationScheduleEntry>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(&format!(
            "SELECT {} FROM irrigation_schedules WHERE field_id = $1 AND date >= $2 \
             ORDER BY date ASC, created_at ASC",
            SCHEDULE_COLUMNS
        ))
        .bind(field_id)
        .bind(from)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(IrrigationScheduleEntry::try_from)
            .collect()
    }

    async fn update_entry_status(
        &self,
        entry_id: Uuid,
        status: ScheduleStatus,
    ) -> AppResult<IrrigationScheduleEntry> {
        let current = self
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Schedule entry".to_string()))?;

        if !current.status.can_transition_to(status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move schedule entry from {} to {}",
                current.status, status
            )));
        }

        // Guarded on the old status so a concurrent update cannot be overwritten.
        let row = sqlx::query_as::<_, ScheduleRow>(&format!(
            "UPDATE irrigation_schedules SET status = $2 WHERE id = $1 AND status = 'pending' \
             RETURNING {}",
            SCHEDULE_COLUMNS
        ))
        .bind(entry_id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::InvalidStateTransition("Schedule entry is no longer pending".to_string())
        })?;

        IrrigationScheduleEntry::try_from(row)
    }

    async fn get_weather_cache(&self, location_key: &str) -> AppResult<Option<WeatherCacheRecord>> {
        let row = sqlx::query_as::<_, WeatherCacheRow>(
            "SELECT location_key, payload, updated_at FROM weather_cache WHERE location_key = $1",
        )
        .bind(location_key)
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let bundle: ForecastBundle = serde_json::from_value(row.payload)
            .map_err(|e| AppError::Internal(format!("Corrupt weather cache entry: {}", e)))?;

        Ok(Some(WeatherCacheRecord {
            location_key: row.location_key,
            bundle,
            updated_at: row.updated_at,
        }))
    }

    async fn put_weather_cache(
        &self,
        location_key: &str,
        bundle: &ForecastBundle,
        fetched_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let payload =
            serde_json::to_value(bundle).map_err(|e| AppError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO weather_cache (location_key, payload, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (location_key)
            DO UPDATE SET payload = EXCLUDED.payload, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(location_key)
        .bind(&payload)
        .bind(fetched_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
