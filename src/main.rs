//! Sluice ingestion service.
//!
//! Main entry point for the sluice server. Initializes all subsystems and
//! coordinates graceful startup and shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use sluice_api::{AppState, Config};
use sluice_core::{storage::schema::ensure_schema, RealClock, Storage};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting sluice ingestion service");
    info!(
        database_url = %config.database_url_masked(),
        host = %config.host,
        port = config.port,
        max_connections = config.database_max_connections,
        "Configuration loaded"
    );

    // Create database connection pool
    let db_pool = create_database_pool(&config).await?;
    info!("Database connection pool established");

    // Bootstrap schema
    ensure_schema(&db_pool).await.context("Failed to ensure database schema")?;
    info!("Database schema ensured");

    let storage = Storage::new(db_pool.clone());
    let state = AppState::new(storage, Arc::new(RealClock::new()));

    let addr = config.parse_server_addr()?;
    info!(addr = %addr, "Sluice is ready to receive payloads");

    sluice_api::start_server(state, addr, Duration::from_secs(config.request_timeout))
        .await
        .context("Server failed")?;

    // Close database connections
    db_pool.close().await;
    info!("Database connections closed");

    info!("Sluice shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
///
/// `RUST_LOG` in the environment wins over the configured default filter.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    let mut retries = 0;
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    let database_url = config.normalized_database_url();

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connection_timeout))
            .idle_timeout(Duration::from_secs(config.database_idle_timeout))
            .max_lifetime(Duration::from_secs(config.database_max_lifetime))
            .connect(&database_url)
            .await
        {
            Ok(pool) => {
                // Verify connection works
                sqlx::query("SELECT 1")
                    .fetch_one(&pool)
                    .await
                    .context("Failed to verify database connection")?;

                return Ok(pool);
            },
            Err(_e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}
