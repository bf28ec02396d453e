//! Driven port for the transactional account store.
//!
//! The store owns every piece of mutable account state: user balances,
//! product stock and ownership. Each method is one atomic unit of work;
//! adapters must roll back on any failure before returning an error.

use async_trait::async_trait;

use crate::domain::{
    Coin, Deposit, Product, ProductId, Quantity, Role, User, UserId, Username,
};

use super::credential_verifier::CredentialHash;
use super::define_port_error;

define_port_error! {
    /// Errors raised by account store adapters.
    pub enum AccountStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "account store connection failed: {message}",
        /// A statement or transaction failed during execution.
        Query { message: String } =>
            "account store query failed: {message}",
        /// The operation did not finish within its deadline.
        Timeout { operation: String } =>
            "account store operation timed out: {operation}",
        /// Registration collided with an existing username.
        DuplicateUsername { username: String } =>
            "username already registered: {username}",
    }
}

/// A user record about to be inserted. New accounts start with an empty
/// balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: UserId,
    pub username: Username,
    pub credential: CredentialHash,
    pub role: Role,
}

/// A user together with its stored credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub credential: CredentialHash,
}

/// A validated purchase ready to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOrder {
    pub buyer_id: UserId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// `quantity * cost`, already checked against the buyer's balance.
    pub total: u64,
}

/// Result of committing a [`PurchaseOrder`].
///
/// The stock and balance updates are conditional on there still being
/// enough of each when the transaction runs; when either condition fails the
/// whole transaction is rolled back and the matching variant is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Committed {
        deposit: Deposit,
        amount_available: u64,
    },
    StockExhausted,
    DepositExhausted,
}

/// Port for account and catalogue persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new user with a zero balance.
    async fn insert_user(&self, user: &NewUser) -> Result<User, AccountStoreError>;

    /// Find a user by id.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, AccountStoreError>;

    /// Find a user and its credential hash by username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, AccountStoreError>;

    /// Atomically add `coin` to the user's balance, returning the updated user.
    async fn credit_deposit(
        &self,
        id: &UserId,
        coin: Coin,
    ) -> Result<Option<User>, AccountStoreError>;

    /// Atomically set the user's balance to zero, returning the updated user.
    async fn reset_deposit(&self, id: &UserId) -> Result<Option<User>, AccountStoreError>;

    /// Persist a newly listed product.
    async fn insert_product(&self, product: &Product) -> Result<(), AccountStoreError>;

    /// Find a product by id.
    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, AccountStoreError>;

    /// Overwrite name and cost of a product owned by `product.seller_id()`.
    ///
    /// Returns `false` when no matching row was updated.
    async fn update_product(&self, product: &Product) -> Result<bool, AccountStoreError>;

    /// Delete a product scoped to its seller, returning the rows removed.
    async fn delete_product(
        &self,
        id: &ProductId,
        seller_id: &UserId,
    ) -> Result<u64, AccountStoreError>;

    /// All products. Rows that cannot be decoded are skipped by adapters.
    async fn list_products(&self) -> Result<Vec<Product>, AccountStoreError>;

    /// Decrement stock and balance together.
    async fn commit_purchase(
        &self,
        order: &PurchaseOrder,
    ) -> Result<PurchaseOutcome, AccountStoreError>;
}
