//! Irrigation Planner - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use irrigation_planner::{
    create_app,
    external::{TextGenerationClient, TextGenerator, WeatherClient},
    services::{
        IrrigationScheduler, NotificationService, PgIrrigationStore, ProfileAdvisor,
        WeatherService,
    },
    AppState, Config,
};
use shared::ReferenceTables;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "irrigation_server=debug,irrigation_planner=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Irrigation Planner Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // Wire collaborators
    let store = Arc::new(PgIrrigationStore::new(db_pool.clone()));
    let weather_client = WeatherClient::with_base_url(
        config.weather.api_key.clone(),
        config.weather.api_endpoint.clone(),
    );
    let weather = WeatherService::new(
        store.clone(),
        Arc::new(weather_client),
        chrono::Duration::minutes(config.schedule.cache_ttl_minutes),
    );

    let generator = TextGenerationClient::from_config(&config.ai)?
        .map(|client| Arc::new(client) as Arc<dyn TextGenerator>);
    if generator.is_none() {
        tracing::info!("No AI API key configured, water-need advisor disabled");
    }

    let scheduler = IrrigationScheduler::new(
        Arc::new(ReferenceTables::builtin()),
        store.clone(),
        weather,
        ProfileAdvisor::new(generator),
        Arc::new(NotificationService::new(db_pool)),
        config.schedule.clone(),
    );

    // Create application state
    let state = AppState {
        store,
        scheduler: Arc::new(scheduler),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
