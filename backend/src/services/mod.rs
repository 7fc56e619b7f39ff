//! Business logic services for the Irrigation Planner

pub mod advisor;
pub mod irrigation;
pub mod notification;
pub mod store;
pub mod weather;

pub use advisor::{Advice, NoAdviceReason, ProfileAdvisor};
pub use irrigation::{IrrigationScheduler, ScheduleRequest};
pub use notification::{NotificationService, Notifier};
pub use store::{IrrigationStore, PgIrrigationStore};
pub use weather::{CacheLookup, WeatherService};
