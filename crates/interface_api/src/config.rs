//! API configuration

use serde::Deserialize;
use std::time::Duration;

use core_kernel::Timezone;
use infra_db::DatabaseConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database URL; the in-memory store is used when absent
    #[serde(default)]
    pub database_url: Option<String>,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Timezone used to decide whether a cashing date is in the future
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    /// Seconds a request waits for a database connection
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_max_lifetime_secs")]
    pub db_max_lifetime_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

fn default_db_min_connections() -> u32 {
    2
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_secs() -> u64 {
    30
}

fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_db_max_lifetime_secs() -> u64 {
    1800
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            log_level: default_log_level(),
            timezone: default_timezone(),
            db_min_connections: default_db_min_connections(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_max_lifetime_secs: default_db_max_lifetime_secs(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured timezone
    pub fn timezone(&self) -> Result<Timezone, String> {
        self.timezone.parse()
    }

    /// Pool settings for the configured database, if any
    pub fn database_config(&self) -> Option<DatabaseConfig> {
        let url = self.database_url.as_deref()?;
        Some(
            DatabaseConfig::new(url)
                .pool_size(self.db_min_connections, self.db_max_connections)
                .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
                .idle_timeout(Duration::from_secs(self.db_idle_timeout_secs))
                .max_lifetime(Duration::from_secs(self.db_max_lifetime_secs)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();

        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(config.database_url.is_none());
        assert!(config.timezone().is_ok());
    }

    #[test]
    fn test_invalid_timezone_is_reported() {
        let config = ApiConfig {
            timezone: "Mars/Olympus".to_string(),
            ..ApiConfig::default()
        };

        assert!(config.timezone().is_err());
    }

    #[test]
    fn test_database_config_follows_pool_settings() {
        assert!(ApiConfig::default().database_config().is_none());

        let config = ApiConfig {
            database_url: Some("postgres://localhost/association".to_string()),
            db_min_connections: 1,
            db_max_connections: 4,
            db_acquire_timeout_secs: 5,
            ..ApiConfig::default()
        };
        let database = config.database_config().unwrap();

        assert_eq!(database.url, "postgres://localhost/association");
        assert_eq!((database.min_connections, database.max_connections), (1, 4));
        assert_eq!(database.acquire_timeout, Duration::from_secs(5));
        assert_eq!(database.max_lifetime, Duration::from_secs(1800));
    }
}
