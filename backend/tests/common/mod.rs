//! In-memory collaborators shared by the backend integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use irrigation_planner::config::ScheduleConfig;
use irrigation_planner::error::{AppError, AppResult};
use irrigation_planner::external::{ForecastProvider, TextGenerator};
use irrigation_planner::services::notification::NotificationRequest;
use irrigation_planner::services::store::WeatherCacheRecord;
use irrigation_planner::services::{
    IrrigationScheduler, IrrigationStore, Notifier, ProfileAdvisor, WeatherService,
};
use rust_decimal::Decimal;
use shared::{
    Field, ForecastBundle, ForecastSample, GpsCoordinates, IrrigationScheduleEntry,
    ReferenceTables, ScheduleStatus,
};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn konya() -> GpsCoordinates {
    GpsCoordinates::new(dec("37.87"), dec("32.48"))
}

// ============================================================================
// Forecast fixtures
// ============================================================================

pub fn sample(timestamp: DateTime<Utc>, temp: f64, humidity: f64, rain: f64) -> ForecastSample {
    ForecastSample {
        timestamp,
        temperature_celsius: temp,
        humidity_percent: humidity,
        rain_3h_mm: rain,
        condition: if rain > 0.0 { "rain" } else { "clear sky" }.to_string(),
    }
}

/// Eight 3-hour samples covering `day` (UTC)
pub fn day_samples(day: NaiveDate, temp: f64, humidity: f64, rain_each: f64) -> Vec<ForecastSample> {
    (0..8)
        .map(|i| {
            let ts = day.and_hms_opt(0, 0, 0).unwrap().and_utc() + Duration::hours(3 * i);
            sample(ts, temp, humidity, rain_each)
        })
        .collect()
}

pub fn bundle(samples: Vec<ForecastSample>) -> ForecastBundle {
    ForecastBundle {
        location_name: "Konya".to_string(),
        timezone_offset_seconds: 0,
        samples,
    }
}

// ============================================================================
// Store
// ============================================================================

#[derive(Default)]
pub struct StoreState {
    pub fields: HashMap<Uuid, Field>,
    pub entries: Vec<IrrigationScheduleEntry>,
    pub cache: HashMap<String, WeatherCacheRecord>,
    pub insert_calls: usize,
    pub fail_inserts: bool,
    pub fail_field_lookups: bool,
    pub fail_cache_writes: bool,
}

#[derive(Default)]
pub struct FakeStore {
    pub state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_field(&self, crop: &str, soil: &str) -> Field {
        let now = Utc::now();
        let field = Field {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "North plot".to_string(),
            crop_type: crop.to_string(),
            soil_type: soil.to_string(),
            latitude: Some(dec("37.87")),
            longitude: Some(dec("32.48")),
            area_decares: Some(dec("12.5")),
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().fields.insert(field.id, field.clone());
        field
    }

    pub fn seed_cache(&self, coordinates: GpsCoordinates, bundle: ForecastBundle, updated_at: DateTime<Utc>) {
        let key = coordinates.location_key();
        self.state.lock().unwrap().cache.insert(
            key.clone(),
            WeatherCacheRecord {
                location_key: key,
                bundle,
                updated_at,
            },
        );
    }

    pub fn entries(&self) -> Vec<IrrigationScheduleEntry> {
        self.state.lock().unwrap().entries.clone()
    }
}

#[async_trait]
impl IrrigationStore for FakeStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn get_field(&self, field_id: Uuid) -> AppResult<Option<Field>> {
        let state = self.state.lock().unwrap();
        if state.fail_field_lookups {
            return Err(AppError::Internal("field lookup failed".to_string()));
        }
        Ok(state.fields.get(&field_id).cloned())
    }

    async fn insert_schedule(&self, entries: &[IrrigationScheduleEntry]) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.insert_calls += 1;
        if state.fail_inserts {
            return Err(AppError::Internal("insert failed".to_string()));
        }
        for entry in entries {
            state.entries.retain(|e| {
                !(e.field_id == entry.field_id
                    && e.date == entry.date
                    && e.status == ScheduleStatus::Pending)
            });
        }
        state.entries.extend_from_slice(entries);
        Ok(())
    }

    async fn list_schedule(
        &self,
        field_id: Uuid,
        from: NaiveDate,
    ) -> AppResult<Vec<IrrigationScheduleEntry>> {
        let mut entries: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.field_id == field_id && e.date >= from)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn update_entry_status(
        &self,
        entry_id: Uuid,
        status: ScheduleStatus,
    ) -> AppResult<IrrigationScheduleEntry> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| AppError::NotFound("Schedule entry".to_string()))?;
        if !entry.status.can_transition_to(status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move schedule entry from {} to {}",
                entry.status, status
            )));
        }
        entry.status = status;
        Ok(entry.clone())
    }

    async fn get_weather_cache(&self, location_key: &str) -> AppResult<Option<WeatherCacheRecord>> {
        Ok(self.state.lock().unwrap().cache.get(location_key).cloned())
    }

    async fn put_weather_cache(
        &self,
        location_key: &str,
        bundle: &ForecastBundle,
        fetched_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_cache_writes {
            return Err(AppError::Internal("cache write failed".to_string()));
        }
        state.cache.insert(
            location_key.to_string(),
            WeatherCacheRecord {
                location_key: location_key.to_string(),
                bundle: bundle.clone(),
                updated_at: fetched_at,
            },
        );
        Ok(())
    }
}

// ============================================================================
// Forecast provider
// ============================================================================

pub struct FakeProvider {
    bundle: Option<ForecastBundle>,
    pub calls: AtomicUsize,
}

impl FakeProvider {
    pub fn ok(bundle: ForecastBundle) -> Arc<Self> {
        Arc::new(Self {
            bundle: Some(bundle),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            bundle: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastProvider for FakeProvider {
    async fn fetch_forecast(&self, _coordinates: GpsCoordinates) -> AppResult<ForecastBundle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bundle
            .clone()
            .ok_or(AppError::WeatherServiceUnavailable)
    }
}

// ============================================================================
// Text generator
// ============================================================================

pub struct FakeGenerator {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(AppError::ExternalService)
    }
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<NotificationRequest>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, request: NotificationRequest) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Internal("notifier down".to_string()));
        }
        self.sent.lock().unwrap().push(request);
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub store: Arc<FakeStore>,
    pub provider: Arc<FakeProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub scheduler: Arc<IrrigationScheduler>,
}

pub fn harness(
    provider: Arc<FakeProvider>,
    generator: Option<Arc<FakeGenerator>>,
    notifier: Arc<RecordingNotifier>,
) -> Harness {
    let store = FakeStore::new();
    harness_with_store(store, provider, generator, notifier)
}

pub fn harness_with_store(
    store: Arc<FakeStore>,
    provider: Arc<FakeProvider>,
    generator: Option<Arc<FakeGenerator>>,
    notifier: Arc<RecordingNotifier>,
) -> Harness {
    let weather = WeatherService::new(store.clone(), provider.clone(), Duration::minutes(30));
    let advisor = ProfileAdvisor::new(generator.map(|g| g as Arc<dyn TextGenerator>));
    let scheduler = IrrigationScheduler::new(
        Arc::new(ReferenceTables::builtin()),
        store.clone(),
        weather,
        advisor,
        notifier.clone(),
        ScheduleConfig::default(),
    );

    Harness {
        store,
        provider,
        notifier,
        scheduler: Arc::new(scheduler),
    }
}
