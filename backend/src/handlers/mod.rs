//! HTTP handlers

pub mod health;
pub mod irrigation;

pub use health::health_check;
pub use irrigation::{generate_schedule, list_schedule, update_entry_status};
