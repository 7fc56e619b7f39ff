//! External API integrations

pub mod text_generation;
pub mod weather;

pub use text_generation::{TextGenerationClient, TextGenerator};
pub use weather::{ForecastProvider, WeatherClient};
