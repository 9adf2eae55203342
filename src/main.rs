//! Barbershop booking server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barbershop_booking::{
    api,
    clock::SystemClock,
    config::{AppConfig, LoggingConfig, StorageBackend},
    models::BusinessCalendar,
    repository::{BookingStore, BookingsRepository, MemoryBookingStore},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    tracing::info!("Starting barbershop booking server v{}", env!("CARGO_PKG_VERSION"));

    let calendar = BusinessCalendar::from_config(&config.calendar)
        .map_err(|e| anyhow::anyhow!("Invalid calendar configuration: {}", e))?;

    let store: Arc<dyn BookingStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;

            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;

            tracing::info!("Database migrations completed");
            Arc::new(BookingsRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory booking store; bookings are lost on restart");
            Arc::new(MemoryBookingStore::new())
        }
    };

    let services = Services::new(
        store,
        &config.catalog,
        &config.storage,
        calendar,
        Arc::new(SystemClock),
    )?;

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("barbershop_booking={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
