//! bb8 pool of `diesel-async` PostgreSQL connections for the account store.
//!
//! The URL is checked before the pool is built so a typo in
//! `VENDING_DATABASE_URL` fails at startup with a readable message rather than
//! as a checkout timeout on the first request.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::info;

use crate::domain::ports::define_port_error;

const ACCEPTED_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

define_port_error! {
    /// Failures while building the pool or checking out a connection.
    pub enum PoolError {
        /// The URL does not name a PostgreSQL server.
        InvalidUrl { scheme: String } =>
            "database URL must start with postgres:// or postgresql:// (got '{scheme}')",
        /// The pool could not be built.
        Build { message: String } => "failed to build connection pool: {message}",
        /// No connection became available in time.
        Checkout { message: String } => "failed to get connection from pool: {message}",
    }
}

/// Sizing and timeouts for [`DbPool`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://vending@localhost/vending")
///     .with_max_size(20)
///     .with_checkout_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_size(), 20);
/// assert_eq!(config.checkout_timeout(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Ten connections with a five second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            checkout_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_size(self, max_size: u32) -> Self {
        Self { max_size, ..self }
    }

    pub fn with_checkout_timeout(self, checkout_timeout: Duration) -> Self {
        Self {
            checkout_timeout,
            ..self
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn checkout_timeout(&self) -> Duration {
        self.checkout_timeout
    }

    fn validate(&self) -> Result<(), PoolError> {
        let url = self.database_url.trim();
        if ACCEPTED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            return Ok(());
        }
        let scheme = url.split_once("://").map_or("", |(scheme, _)| scheme);
        Err(PoolError::invalid_url(scheme))
    }
}

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Validate `config` and build the pool. Connections are opened lazily.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidUrl`] for a non-PostgreSQL URL and
    /// [`PoolError::Build`] when bb8 rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url().trim());
        let inner = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        info!(
            max_size = config.max_size,
            checkout_timeout = ?config.checkout_timeout,
            "database pool ready"
        );
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when none becomes free within the checkout
    /// timeout or a new connection cannot be opened.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
