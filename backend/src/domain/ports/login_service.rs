//! Driving port for login.
//!
//! Inbound adapters call it to check credentials without knowing how users
//! or hashes are stored, so handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the matching user, without its
    /// credential hash.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
