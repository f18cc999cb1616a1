//! Era API binary for World One.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `world-one.yaml` (or `W1_CONFIG`)
//! 2. Initialize structured logging (tracing) from the logging section
//! 3. Connect to `PostgreSQL` and run migrations
//! 4. Serve the era API until `Ctrl-C`
//! 5. Close the pool

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use world_one_api::config::LoggingSettings;
use world_one_api::{ApiConfig, AppState, LogFormat, PgBackend, build_router, start_server};
use world_one_db::{PostgresConfig, PostgresPool};

/// Application entry point for the era API.
///
/// # Errors
///
/// Returns an error if configuration, the database or the listener fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = ApiConfig::load()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        addr = %config.server.addr,
        request_timeout_ms = config.server.request_timeout_ms,
        max_connections = config.database.max_connections,
        "Configuration loaded"
    );

    // 3. Connect and migrate.
    let pool = PostgresPool::connect(
        &PostgresConfig::new(&config.database.url)
            .with_max_connections(config.database.max_connections),
    )
    .await?;
    pool.run_migrations().await?;

    // 4. Serve.
    let state = Arc::new(AppState::new(
        PgBackend::new(pool.clone()),
        config.server.request_timeout(),
    ));
    let served = start_server(&config.server.addr, build_router(state)).await;

    // 5. Shut down.
    pool.close().await;
    served?;
    Ok(())
}

fn init_tracing(logging: &LoggingSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(logging.include_source)
        .with_line_number(logging.include_source);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}
