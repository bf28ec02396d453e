//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `VENDING_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 7777);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

/// HTTP server timeouts.
pub const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const KEEP_ALIVE: Duration = Duration::from_secs(60);
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// Errors raised while validating loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("database URL is required (set VENDING_DATABASE_URL or --database-url)")]
    MissingDatabaseUrl,
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },
}

/// Configuration values for the HTTP server and its store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "VENDING")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled store connections.
    pub db_max_connections: Option<u32>,
    /// Per-operation store deadline in milliseconds.
    pub store_timeout_ms: Option<u64>,
    /// Apply pending schema migrations before serving.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    /// Listen address, falling back to `0.0.0.0:7777`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        match self.bind_addr.as_deref() {
            None => Ok(DEFAULT_BIND_ADDR),
            Some(value) => value
                .parse()
                .map_err(|source| SettingsError::InvalidBindAddr {
                    value: value.to_owned(),
                    source,
                }),
        }
    }

    /// Database URL; required.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool size, falling back to 10.
    pub fn db_max_connections(&self) -> Result<u32, SettingsError> {
        match self.db_max_connections {
            Some(0) => Err(SettingsError::NotPositive {
                name: "db_max_connections",
            }),
            Some(size) => Ok(size),
            None => Ok(DEFAULT_DB_MAX_CONNECTIONS),
        }
    }

    /// Whether to migrate at startup; on unless explicitly disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Store deadline, falling back to five seconds.
    pub fn store_timeout(&self) -> Result<Duration, SettingsError> {
        match self.store_timeout_ms {
            Some(0) => Err(SettingsError::NotPositive {
                name: "store_timeout_ms",
            }),
            Some(ms) => Ok(Duration::from_millis(ms)),
            None => Ok(Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS)),
        }
    }
}
