//! Route definitions for the Irrigation Planner

use axum::{
    routing::{get, patch},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/fields", field_routes())
        .nest("/irrigation-schedule", schedule_entry_routes())
}

/// Per-field schedule routes
fn field_routes() -> Router<AppState> {
    Router::new().route(
        "/:field_id/irrigation-schedule",
        get(handlers::list_schedule).post(handlers::generate_schedule),
    )
}

/// Schedule entry routes
fn schedule_entry_routes() -> Router<AppState> {
    Router::new().route("/:entry_id/status", patch(handlers::update_entry_status))
}
