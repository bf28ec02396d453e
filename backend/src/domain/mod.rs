//! Domain primitives, aggregates and services.
//!
//! Purpose: Define the strongly typed vending-machine model (users, coins,
//! deposits, products) and the services that enforce its rules. Inbound
//! adapters reach the services through the driving ports in [`ports`];
//! the services reach storage and security adapters through driven ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Coin, Deposit, Change — accepted denominations and balances.
//! - User, Product — the two persisted aggregates.
//! - AuthorizationPipeline — bearer-token request authorizer.
//! - AccountService, DepositService, PurchaseService, CatalogService —
//!   driving-port implementations.

pub mod accounts;
pub mod auth;
pub mod authorization;
pub mod catalog;
pub mod coins;
pub mod deposit;
pub mod error;
pub mod ports;
pub mod product;
pub mod purchase;
#[cfg(test)]
pub(crate) mod service_test_helpers;
mod store_errors;
pub mod user;

pub use self::accounts::AccountService;
pub use self::auth::{AccessClaims, LoginCredentials, LoginValidationError, SignedToken};
pub use self::authorization::{AuthorizationPipeline, Capability, ProductScope, RequestContext};
pub use self::catalog::CatalogService;
pub use self::coins::{
    Change, Coin, Deposit, DepositNotCoinAligned, InvalidCoin, make_change,
};
pub use self::deposit::DepositService;
pub use self::error::{Error, ErrorCode};
pub use self::product::{
    Cost, Product, ProductDraft, ProductId, ProductName, ProductValidationError, Quantity,
};
pub use self::purchase::{PurchaseReceipt, PurchaseService};
pub use self::user::{
    PASSWORD_MIN, Password, Role, USERNAME_MIN, User, UserId, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
