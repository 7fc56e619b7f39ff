//! Irrigation schedule HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{GpsCoordinates, ScheduleStatus};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::irrigation::ScheduleRequest;
use crate::AppState;

/// Input for generating a schedule
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateScheduleInput {
    #[validate(custom = "validate_display_name")]
    pub crop_type: String,
    #[validate(custom = "validate_display_name")]
    pub soil_type: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GenerateScheduleInput {
    fn into_request(self, field_id: Uuid) -> AppResult<ScheduleRequest> {
        self.validate()?;
        shared::validate_coordinates(self.latitude, self.longitude)
            .map_err(|msg| AppError::validation("coordinates", msg))?;

        Ok(ScheduleRequest {
            field_id,
            crop_type: self.crop_type.trim().to_string(),
            soil_type: self.soil_type.trim().to_string(),
            coordinates: GpsCoordinates::new(self.latitude, self.longitude),
        })
    }
}

fn validate_display_name(name: &str) -> Result<(), validator::ValidationError> {
    shared::validate_name(name).map_err(|msg| {
        let mut error = validator::ValidationError::new("name");
        error.message = Some(msg.into());
        error
    })
}

/// Query for listing a schedule
#[derive(Debug, Deserialize)]
pub struct ListScheduleQuery {
    /// First date to include, defaults to today
    pub from: Option<NaiveDate>,
}

/// Input for changing an entry's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: String,
}

/// Generate and store a schedule for a field
pub async fn generate_schedule(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
    Json(input): Json<GenerateScheduleInput>,
) -> impl IntoResponse {
    let request = match input.into_request(field_id) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let outcome = state.scheduler.generate(&request).await;
    (StatusCode::OK, Json(outcome)).into_response()
}

/// List a field's schedule entries
pub async fn list_schedule(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
    Query(query): Query<ListScheduleQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());

    match state.store.list_schedule(field_id, from).await {
        Ok(entries) => {
            (StatusCode::OK, Json(serde_json::json!({ "entries": entries }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Mark a pending entry completed, skipped or cancelled
pub async fn update_entry_status(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> impl IntoResponse {
    let status: ScheduleStatus = match input.status.trim().parse() {
        Ok(status) => status,
        Err(e) => return AppError::validation("status", format!("{}", e)).into_response(),
    };

    match state.store.update_entry_status(entry_id, status).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => e.into_response(),
    }
}
