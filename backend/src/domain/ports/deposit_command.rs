//! Driving port for balance mutations.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Domain use-case port for coin deposits and resets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepositCommand: Send + Sync {
    /// Add one coin of `coin_value` to the user's balance.
    async fn deposit_coin(&self, user: &User, coin_value: u64) -> Result<User, Error>;

    /// Set the user's balance to zero.
    async fn reset_deposit(&self, user: &User) -> Result<User, Error>;
}
