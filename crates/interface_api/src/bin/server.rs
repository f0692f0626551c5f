//! Association Billing - API Server Binary
//!
//! This binary starts the HTTP API server for the association billing system.
//!
//! # Usage
//!
//! ```bash
//! # Run against the in-memory store
//! cargo run --bin association-api
//!
//! # Run against PostgreSQL
//! API_PORT=8080 DATABASE_URL=postgres://... cargo run --bin association-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` / `DATABASE_URL` - PostgreSQL connection string; the
//!   in-memory store is used when neither is set
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_TIMEZONE` - Timezone for cashing dates (default: Europe/Paris)
//! * `API_DB_MIN_CONNECTIONS` / `API_DB_MAX_CONNECTIONS` - Pool size (default: 2 / 10)
//! * `API_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a connection (default: 30)
//! * `API_DB_IDLE_TIMEOUT_SECS` / `API_DB_MAX_LIFETIME_SECS` - Connection
//!   recycling (default: 600 / 1800)

use std::net::SocketAddr;
use std::sync::Arc;

use core_kernel::{Clock, SystemClock};
use domain_billing::{AssociationStore, InMemoryAssociationStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresAssociationStore};
use interface_api::{config::ApiConfig, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, opens the store, and starts the
/// HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - The configured timezone is invalid
/// - Database connection or migrations fail
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.timezone,
        "Starting Association Billing API Server"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.timezone()?));
    let store = open_store(config.database_config()).await?;

    let app = create_router(store, clock, config.clone());

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to individual variables and defaults if the `API_` prefixed
/// configuration cannot be read.
fn load_config() -> ApiConfig {
    let mut config = ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Falling back to default configuration: {}", e);
        ApiConfig::default()
    });

    if config.database_url.is_none() {
        config.database_url = std::env::var("DATABASE_URL").ok();
    }
    if let Ok(level) = std::env::var("RUST_LOG") {
        config.log_level = level;
    }

    config
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Opens the PostgreSQL store and applies migrations, or falls back to the
/// in-memory store when no database is configured.
async fn open_store(
    database: Option<DatabaseConfig>,
) -> Result<Arc<dyn AssociationStore>, Box<dyn std::error::Error>> {
    match database {
        Some(database) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(database).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database ready");
            Ok(Arc::new(PostgresAssociationStore::new(pool)))
        }
        None => {
            tracing::warn!("No database configured, data is kept in memory only");
            Ok(Arc::new(InMemoryAssociationStore::new()))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
