//! Database connection pool management
//!
//! Connection pool configuration and creation for PostgreSQL using SQLx.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use domain_ledger::StoreError;

/// Type alias for the PostgreSQL connection pool
pub type DatabasePool = PgPool;

/// Configuration options for the database connection pool
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use infra_db::DatabaseConfig;
///
/// let config = DatabaseConfig::new("postgres://localhost/hospital")
///     .max_connections(20)
///     .min_connections(5)
///     .connect_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
    /// Idle timeout before closing a connection
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    /// Creates a new database configuration with the given connection URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60),
            idle_timeout: Duration::from_secs(10 * 60),
        }
    }

    /// Builds a configuration from the environment.
    ///
    /// Reads `DATABASE_URL` (required) and the optional
    /// `HOSPITAL_DB_MAX_CONNECTIONS` / `HOSPITAL_DB_MIN_CONNECTIONS` /
    /// `HOSPITAL_DB_CONNECT_TIMEOUT_SECS` overrides. A `.env` file is
    /// honored when present.
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::Connection("DATABASE_URL is not set".to_string()))?;
        let mut config = Self::new(url);

        if let Some(max) = env_u32("HOSPITAL_DB_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(min) = env_u32("HOSPITAL_DB_MIN_CONNECTIONS")? {
            config.min_connections = min;
        }
        if let Some(secs) = env_u32("HOSPITAL_DB_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs as u64);
        }
        Ok(config)
    }

    /// Sets the maximum number of connections in the pool
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections to maintain
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout duration
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the maximum lifetime of a connection
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Sets the idle timeout before closing a connection
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("postgres://localhost/hospital")
    }
}

fn env_u32(name: &str) -> Result<Option<u32>, StoreError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| StoreError::Connection(format!("{} must be an integer, got '{}'", name, value))),
        Err(_) => Ok(None),
    }
}

/// Creates a database connection pool with the given configuration
///
/// # Errors
///
/// Returns `StoreError::Connection` if the pool cannot be created
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, StoreError> {
    info!(
        "Creating database pool with max_connections={}, min_connections={}",
        config.max_connections, config.min_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    info!("Database pool created successfully");
    Ok(pool)
}

/// Creates a connection pool from a URL string with default settings
pub async fn create_pool_from_url(url: &str) -> Result<DatabasePool, StoreError> {
    create_pool(DatabaseConfig::new(url)).await
}
