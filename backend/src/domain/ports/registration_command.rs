//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Raw registration inputs as received by an inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Domain use-case port for creating accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Validate the inputs, hash the password and persist a new user.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;
}
