//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! [`DieselAccountStore`] implements the domain's `AccountStore` port over a
//! `bb8` pool of `diesel-async` connections. Diesel row structs and table
//! definitions stay private to this module; only domain types cross it.
//!
//! # Example
//!
//! ```no_run
//! use backend::outbound::persistence::{DbPool, DieselAccountStore, PoolConfig};
//!
//! # async fn wire() -> Result<(), backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/vending")).await?;
//! let store = DieselAccountStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_account_store;
mod diesel_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_store::{DEFAULT_OPERATION_TIMEOUT, DieselAccountStore};
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
