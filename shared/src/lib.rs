//! Shared types and calculations for the Irrigation Planner
//!
//! This crate contains the pure domain logic shared between the backend,
//! the browser preview (via WASM), and other components of the system:
//! crop and soil reference data, name normalization, forecast aggregation
//! and the per-day watering formulas.

pub mod irrigation;
pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;

pub use irrigation::*;
pub use models::*;
pub use normalize::*;
pub use types::*;
pub use validation::*;
