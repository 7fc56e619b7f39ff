//! Domain models for the Irrigation Planner

mod advice;
mod crop;
mod field;
mod forecast;
mod schedule;

pub use advice::*;
pub use crop::*;
pub use field::*;
pub use forecast::*;
pub use schedule::*;
