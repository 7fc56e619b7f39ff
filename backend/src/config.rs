//! Configuration management for the Irrigation Planner
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with IRR_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Text-generation API configuration for the water-need advisor
    pub ai: AiConfig,

    /// Schedule generation settings
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Messages API endpoint
    pub api_endpoint: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Response token limit
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// API key; the advisor is disabled when absent or empty
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AiConfig {
    /// API key if one is configured
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    /// Days covered by the assisted schedule
    pub horizon_days: u32,

    /// Days covered by the basic schedule
    pub fallback_days: u32,

    /// Maximum age of a cached forecast in minutes
    pub cache_ttl_minutes: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_days: shared::ASSISTED_HORIZON_DAYS,
            fallback_days: shared::BASIC_HORIZON_DAYS,
            cache_ttl_minutes: 30,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("IRR_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.api_key", "")?
            .set_default("ai.api_endpoint", "https://api.anthropic.com/v1/messages")?
            .set_default("ai.model", "claude-3-5-haiku-latest")?
            .set_default("ai.max_tokens", 512)?
            .set_default("ai.timeout_secs", 30)?
            .set_default("schedule.horizon_days", i64::from(shared::ASSISTED_HORIZON_DAYS))?
            .set_default("schedule.fallback_days", i64::from(shared::BASIC_HORIZON_DAYS))?
            .set_default("schedule.cache_ttl_minutes", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (IRR_ prefix)
            .add_source(
                Environment::with_prefix("IRR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
