//! Deposit manager: coin deposits and balance resets.
//!
//! Role checks happen in the authorization pipeline; this service assumes
//! the caller is a buyer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{AccountStore, DepositCommand};
use crate::domain::{Coin, Error, User};

use super::store_errors::map_store_error;

fn deposit_failed() -> Error {
    Error::internal("deposit failed").with_reason("deposit_failed")
}

fn principal_gone() -> Error {
    Error::not_found("user not found")
}

/// Deposit service implementing [`DepositCommand`].
#[derive(Clone)]
pub struct DepositService<S> {
    store: Arc<S>,
}

impl<S> DepositService<S> {
    /// Create a deposit service backed by `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> DepositCommand for DepositService<S>
where
    S: AccountStore,
{
    async fn deposit_coin(&self, user: &User, coin_value: u64) -> Result<User, Error> {
        let coin = Coin::try_from(coin_value).map_err(|_| {
            Error::invalid_request("coin value not allowed").with_details(json!({
                "code": "invalid_coin",
                "value": coin_value,
                "accepted": Coin::accepted_values(),
            }))
        })?;

        // Persistence failures are reported generically; the cause is only logged.
        match self.store.credit_deposit(user.id(), coin).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(principal_gone()),
            Err(error) => {
                warn!(%error, user_id = %user.id(), %coin, "deposit failed");
                Err(deposit_failed())
            }
        }
    }

    async fn reset_deposit(&self, user: &User) -> Result<User, Error> {
        self.store
            .reset_deposit(user.id())
            .await
            .map_err(map_store_error)?
            .ok_or_else(principal_gone)
    }
}
