//! Translation of account store failures into domain errors.

use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::AccountStoreError;

/// Map a store failure without leaking adapter detail to callers.
pub(crate) fn map_store_error(error: AccountStoreError) -> Error {
    match error {
        AccountStoreError::Connection { message } => {
            warn!(%message, "account store unavailable");
            Error::service_unavailable("account store unavailable")
        }
        AccountStoreError::Timeout { operation } => {
            warn!(%operation, "account store timed out");
            Error::service_unavailable("account store timed out")
        }
        AccountStoreError::Query { message } => {
            warn!(%message, "account store query failed");
            Error::internal("account store error")
        }
        AccountStoreError::DuplicateUsername { .. } => Error::conflict("user already exists"),
    }
}
