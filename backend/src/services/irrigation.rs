//! Irrigation schedule generation
//!
//! Generation runs as a three-tier state machine:
//!
//! 1. **Assisted**: fresh forecast, reference tables and advisor profile,
//!    one entry every `interval` days over the full horizon, with
//!    notifications for the field owner.
//! 2. **Basic**: cached or fresh forecast and reference tables only, one
//!    entry per day over the short horizon, no notifications.
//! 3. **Unavailable**: an empty schedule.
//!
//! Any error inside a tier abandons it and moves on to the next one; no
//! partial result from a failed tier is returned.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Deserialize;
use shared::{
    assisted_day_offsets, assisted_default_weather, basic_default_weather, basic_sample_index,
    plan_assisted_day, plan_basic_day, tenth_decimal, DailyIrrigation, Field, ForecastBundle,
    GpsCoordinates, IrrigationScheduleEntry, ReferenceTables, ScheduleOutcome, ScheduleStatus,
    ScheduleTier,
};
use uuid::Uuid;

use crate::config::ScheduleConfig;
use crate::error::AppResult;
use crate::services::advisor::{AdviceRequest, ProfileAdvisor};
use crate::services::notification::{create_irrigation_reminder, create_weather_warning, Notifier};
use crate::services::store::IrrigationStore;
use crate::services::weather::{day_slice, summarize, WeatherService};

/// Reminders are sent for at most this many watering days
const MAX_REMINDERS: usize = 3;

/// What to plan and where
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub field_id: Uuid,
    pub crop_type: String,
    pub soil_type: String,
    pub coordinates: GpsCoordinates,
}

/// Irrigation scheduler
pub struct IrrigationScheduler {
    tables: Arc<ReferenceTables>,
    store: Arc<dyn IrrigationStore>,
    weather: WeatherService,
    advisor: ProfileAdvisor,
    notifier: Arc<dyn Notifier>,
    settings: ScheduleConfig,
    field_locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl IrrigationScheduler {
    /// Create a new IrrigationScheduler instance
    pub fn new(
        tables: Arc<ReferenceTables>,
        store: Arc<dyn IrrigationStore>,
        weather: WeatherService,
        advisor: ProfileAdvisor,
        notifier: Arc<dyn Notifier>,
        settings: ScheduleConfig,
    ) -> Self {
        Self {
            tables,
            store,
            weather,
            advisor,
            notifier,
            settings,
            field_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Generate and persist a schedule starting today
    pub async fn generate(&self, request: &ScheduleRequest) -> ScheduleOutcome {
        self.generate_at(request, Utc::now()).await
    }

    /// Generate and persist a schedule as of `now`.
    ///
    /// Never fails; an empty outcome with tier `Unavailable` means no
    /// schedule could be produced.
    pub async fn generate_at(&self, request: &ScheduleRequest, now: DateTime<Utc>) -> ScheduleOutcome {
        let lock = self.field_lock(request.field_id);
        let outcome = {
            let _guard = lock.lock().await;
            self.run_tiers(request, now).await
        };
        drop(lock);
        self.release_field_lock(request.field_id);

        outcome
    }

    async fn run_tiers(&self, request: &ScheduleRequest, now: DateTime<Utc>) -> ScheduleOutcome {
        match self.generate_assisted(request, now).await {
            Ok(entries) => {
                tracing::info!(
                    field_id = %request.field_id,
                    tier = %ScheduleTier::Assisted,
                    entries = entries.len(),
                    "Irrigation schedule generated"
                );
                return ScheduleOutcome {
                    tier: ScheduleTier::Assisted,
                    entries,
                };
            }
            Err(e) => {
                tracing::warn!(
                    field_id = %request.field_id,
                    tier = %ScheduleTier::Assisted,
                    error = %e,
                    "Assisted schedule failed, falling back"
                );
            }
        }

        match self.generate_basic(request, now).await {
            Ok(entries) => {
                tracing::info!(
                    field_id = %request.field_id,
                    tier = %ScheduleTier::Basic,
                    entries = entries.len(),
                    "Irrigation schedule generated"
                );
                ScheduleOutcome {
                    tier: ScheduleTier::Basic,
                    entries,
                }
            }
            Err(e) => {
                tracing::warn!(
                    field_id = %request.field_id,
                    tier = %ScheduleTier::Basic,
                    error = %e,
                    "Basic schedule failed, no schedule generated"
                );
                ScheduleOutcome::unavailable()
            }
        }
    }

    // ========================================================================
    // Assisted tier
    // ========================================================================

    async fn generate_assisted(
        &self,
        request: &ScheduleRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<IrrigationScheduleEntry>> {
        let bundle = self.weather.fetch_fresh(request.coordinates, now).await?;
        let summary = summarize(&bundle.samples);
        let today = local_today(&bundle, now);

        let profile = self.tables.crop_profile(&request.crop_type);
        let soil_multiplier = self.tables.soil_multiplier(&request.soil_type);

        let advice = self
            .advisor
            .advise(&AdviceRequest {
                crop_type: &request.crop_type,
                soil_type: &request.soil_type,
                coordinates: request.coordinates,
                month: today.month(),
                summary,
            })
            .await;
        let ai_profile = advice.profile().copied();

        let effective = ai_profile.map_or(profile, |ai| ai.apply_to(profile));
        let interval = ai_profile
            .map(|ai| ai.interval_days)
            .unwrap_or_else(|| self.tables.irrigation_interval(&request.crop_type));
        let window = ai_profile.and_then(|ai| ai.recommended_time_range);

        let days: Vec<DailyIrrigation> = assisted_day_offsets(interval, self.settings.horizon_days)
            .map(|offset| {
                let date = today + Duration::days(i64::from(offset));
                let weather =
                    day_slice(&bundle, date).unwrap_or_else(|| assisted_default_weather(&profile));
                let day = plan_assisted_day(date, &effective, soil_multiplier, weather, window);
                tracing::debug!(
                    field_id = %request.field_id,
                    %date,
                    temperature = day.weather.temperature_celsius,
                    humidity = day.weather.humidity_percent,
                    rain_mm = day.weather.rain_mm,
                    water = day.water_amount,
                    "Planned assisted day"
                );
                day
            })
            .collect();

        let entries: Vec<IrrigationScheduleEntry> = days
            .iter()
            .map(|day| to_entry(request.field_id, day, now))
            .collect();

        // Everything fallible runs before the write
        let owner = self.store.get_field(request.field_id).await?;
        self.store.insert_schedule(&entries).await?;

        match owner {
            Some(field) => {
                self.notify_owner(&field, &days, &entries, bundle.timezone_offset_seconds, now)
                    .await
            }
            None => {
                tracing::warn!(field_id = %request.field_id, "Field not found, skipping notifications");
            }
        }

        Ok(entries)
    }

    /// Reminders for the first watering days and warnings for heavy rain.
    ///
    /// Delivery errors are logged and never abort generation.
    async fn notify_owner(
        &self,
        field: &Field,
        days: &[DailyIrrigation],
        entries: &[IrrigationScheduleEntry],
        utc_offset_seconds: i32,
        now: DateTime<Utc>,
    ) {
        let reminders = entries
            .iter()
            .filter(|entry| !entry.water_amount.is_zero())
            .take(MAX_REMINDERS)
            .map(|entry| {
                create_irrigation_reminder(field.user_id, &field.name, entry, utc_offset_seconds)
            });

        let warnings = days
            .iter()
            .filter_map(|day| day.note.filter(|note| note.is_heavy_rain()).map(|note| (day.date, note)))
            .map(|(date, note)| {
                create_weather_warning(field.user_id, &field.name, date, note.message(), now)
            });

        let requests: Vec<_> = reminders.chain(warnings).collect();
        for request in requests {
            if let Err(e) = self.notifier.notify(request).await {
                tracing::warn!(field_id = %field.id, error = %e, "Failed to send notification");
            }
        }
    }

    // ========================================================================
    // Basic tier
    // ========================================================================

    async fn generate_basic(
        &self,
        request: &ScheduleRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<IrrigationScheduleEntry>> {
        let bundle = self.weather.forecast_for(request.coordinates, now).await?;
        let today = local_today(&bundle, now);

        let base_need = self.tables.base_water_need(&request.crop_type);
        let soil_key = self.tables.resolve(&request.soil_type);

        let entries: Vec<IrrigationScheduleEntry> = (0..self.settings.fallback_days)
            .map(|day| {
                let date = today + Duration::days(i64::from(day));
                let weather = bundle
                    .sample_weather(basic_sample_index(day))
                    .unwrap_or_else(basic_default_weather);
                to_entry(
                    request.field_id,
                    &plan_basic_day(date, base_need, &soil_key, weather),
                    now,
                )
            })
            .collect();

        self.store.insert_schedule(&entries).await?;
        Ok(entries)
    }

    fn field_lock(&self, field_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .field_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(field_id).or_default().clone()
    }

    /// Drop the field's lock once no other generation holds or awaits it
    fn release_field_lock(&self, field_id: Uuid) {
        let mut locks = self
            .field_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks
            .get(&field_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&field_id);
        }
    }
}

/// Today's date at the forecast location
fn local_today(bundle: &ForecastBundle, now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::seconds(i64::from(bundle.timezone_offset_seconds))).date_naive()
}

fn to_entry(field_id: Uuid, day: &DailyIrrigation, now: DateTime<Utc>) -> IrrigationScheduleEntry {
    IrrigationScheduleEntry {
        id: Uuid::new_v4(),
        field_id,
        date: day.date,
        recommended_time: day.window,
        water_amount: tenth_decimal(day.water_amount),
        weather_temp: tenth_decimal(day.weather.temperature_celsius),
        weather_humidity: tenth_decimal(day.weather.humidity_percent),
        weather_condition: day.weather.condition.clone(),
        note: day.note.map(|note| note.to_string()),
        status: ScheduleStatus::Pending,
        created_at: now,
    }
}
