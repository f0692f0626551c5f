//! PostgreSQL pool and schema setup
//!
//! The server builds a [`DatabaseConfig`] from its `API_DB_*` settings, opens
//! the pool with [`create_pool`] and brings the schema up to date with
//! [`run_migrations`] before serving.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::error::DatabaseError;

/// Type alias for the PostgreSQL connection pool
pub type DatabasePool = PgPool;

/// Pool sizing and timeouts
///
/// ```rust
/// use infra_db::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("postgres://localhost/association")
///     .pool_size(2, 20)
///     .acquire_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// How long a unit of work waits for a free connection
    pub acquire_timeout: Duration,
    /// Connections idle longer than this are closed
    pub idle_timeout: Duration,
    /// Connections are recycled after this long
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    /// 2 to 10 connections, 30 s to acquire, 10 min idle, 30 min lifetime
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            min_connections: 2,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(10 * 60),
            max_lifetime: Duration::from_secs(30 * 60),
        }
    }

    /// Sets both bounds; `min` is capped at `max`
    pub fn pool_size(mut self, min: u32, max: u32) -> Self {
        self.max_connections = max.max(1);
        self.min_connections = min.min(self.max_connections);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }
}

/// Opens a connection pool
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if no connection can be made
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!(
        min_connections = config.min_connections,
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Opening database pool"
    );

    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

/// Applies the schema migrations embedded from the workspace `migrations/`
/// directory
///
/// # Errors
///
/// Returns `DatabaseError::MigrationFailed` if a migration cannot be applied
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::new("postgres://localhost/association");

        assert_eq!((config.min_connections, config.max_connections), (2, 10));
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_pool_size_keeps_min_below_max() {
        let config = DatabaseConfig::new("postgres://test").pool_size(8, 4);
        assert_eq!((config.min_connections, config.max_connections), (4, 4));

        let config = DatabaseConfig::new("postgres://test").pool_size(0, 0);
        assert_eq!((config.min_connections, config.max_connections), (0, 1));
    }
}
