//! Test utilities for the backend crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and under the `test-support` feature.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AccountStore, AccountStoreError, CredentialError, CredentialHash, CredentialVerifier, NewUser,
    PurchaseOrder, PurchaseOutcome, StoredCredentials,
};
use crate::domain::{Coin, Deposit, Product, ProductId, User, UserId};

/// Clock whose current instant is set by the test.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forwards (or backwards for negative values).
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Credential verifier storing secrets behind a fixed prefix.
///
/// Keeps integration suites fast; never use outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCredentialVerifier;

const PLAIN_PREFIX: &str = "plain$";

impl CredentialVerifier for PlainCredentialVerifier {
    fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError> {
        Ok(CredentialHash::new(format!("{PLAIN_PREFIX}{secret}")))
    }

    fn verify(&self, secret: &str, hash: &CredentialHash) -> Result<bool, CredentialError> {
        hash.as_str()
            .strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == secret)
            .ok_or_else(|| CredentialError::malformed_hash("missing plain prefix"))
    }
}

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, (User, CredentialHash)>,
    products: HashMap<ProductId, Product>,
    unavailable: bool,
}

/// In-memory [`AccountStore`] with the same conditional-update semantics as
/// the PostgreSQL adapter. A single mutex makes every operation atomic.
#[derive(Default)]
pub struct InMemoryAccountStore {
    state: Mutex<StoreState>,
}

impl InMemoryAccountStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Insert a user directly, bypassing registration and its policies.
    pub fn seed_user(&self, user: User, credential: CredentialHash) {
        self.lock().users.insert(*user.id(), (user, credential));
    }

    /// Insert a product directly.
    pub fn seed_product(&self, product: Product) {
        self.lock().products.insert(*product.id(), product);
    }

    /// Current view of a stored user.
    pub fn user(&self, id: &UserId) -> Option<User> {
        self.lock().users.get(id).map(|(user, _)| user.clone())
    }

    /// Current view of a stored product.
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.lock().products.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("store mutex"),
        }
    }

    fn available(&self) -> Result<MutexGuard<'_, StoreState>, AccountStoreError> {
        let guard = self.lock();
        if guard.unavailable {
            return Err(AccountStoreError::connection("store offline"));
        }
        Ok(guard)
    }
}

fn update_user(
    state: &mut StoreState,
    id: &UserId,
    revise: impl FnOnce(&User) -> Result<Deposit, AccountStoreError>,
) -> Result<Option<User>, AccountStoreError> {
    let Some((user, _)) = state.users.get_mut(id) else {
        return Ok(None);
    };
    let deposit = revise(user)?;
    *user = user.with_deposit(deposit);
    Ok(Some(user.clone()))
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, AccountStoreError> {
        let mut state = self.available()?;
        if state
            .users
            .values()
            .any(|(existing, _)| existing.username() == &user.username)
        {
            return Err(AccountStoreError::duplicate_username(user.username.as_str()));
        }
        let created = User::new(user.id, user.username.clone(), Deposit::ZERO, user.role);
        state
            .users
            .insert(user.id, (created.clone(), user.credential.clone()));
        Ok(created)
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, AccountStoreError> {
        let state = self.available()?;
        Ok(state.users.get(id).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, AccountStoreError> {
        let state = self.available()?;
        Ok(state
            .users
            .values()
            .find(|(user, _)| user.username().as_str() == username)
            .map(|(user, credential)| StoredCredentials {
                user: user.clone(),
                credential: credential.clone(),
            }))
    }

    async fn credit_deposit(
        &self,
        id: &UserId,
        coin: Coin,
    ) -> Result<Option<User>, AccountStoreError> {
        let mut state = self.available()?;
        update_user(&mut state, id, |user| {
            user.deposit()
                .credit(coin)
                .ok_or_else(|| AccountStoreError::query("deposit overflow"))
        })
    }

    async fn reset_deposit(&self, id: &UserId) -> Result<Option<User>, AccountStoreError> {
        let mut state = self.available()?;
        update_user(&mut state, id, |_| Ok(Deposit::ZERO))
    }

    async fn insert_product(&self, product: &Product) -> Result<(), AccountStoreError> {
        let mut state = self.available()?;
        if !state.users.contains_key(product.seller_id()) {
            return Err(AccountStoreError::query("seller does not exist"));
        }
        state.products.insert(*product.id(), product.clone());
        Ok(())
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, AccountStoreError> {
        let state = self.available()?;
        Ok(state.products.get(id).cloned())
    }

    async fn update_product(&self, product: &Product) -> Result<bool, AccountStoreError> {
        let mut state = self.available()?;
        match state.products.get_mut(product.id()) {
            Some(stored) if stored.seller_id() == product.seller_id() => {
                *stored = stored.revised(product.name().clone(), product.cost());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_product(
        &self,
        id: &ProductId,
        seller_id: &UserId,
    ) -> Result<u64, AccountStoreError> {
        let mut state = self.available()?;
        let owned = state
            .products
            .get(id)
            .is_some_and(|product| product.is_owned_by(seller_id));
        if owned {
            state.products.remove(id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn list_products(&self) -> Result<Vec<Product>, AccountStoreError> {
        let state = self.available()?;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| {
            a.name()
                .as_str()
                .cmp(b.name().as_str())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        Ok(products)
    }

    async fn commit_purchase(
        &self,
        order: &PurchaseOrder,
    ) -> Result<PurchaseOutcome, AccountStoreError> {
        let mut state = self.available()?;
        let quantity = order.quantity.value();

        let Some(amount_available) = state
            .products
            .get(&order.product_id)
            .and_then(|product| product.amount_available().checked_sub(quantity))
        else {
            return Ok(PurchaseOutcome::StockExhausted);
        };
        let Some(deposit) = state
            .users
            .get(&order.buyer_id)
            .and_then(|(buyer, _)| buyer.deposit().debit(order.total))
        else {
            return Ok(PurchaseOutcome::DepositExhausted);
        };

        if let Some(product) = state.products.get_mut(&order.product_id) {
            *product = product.with_stock(amount_available);
        }
        if let Some((buyer, _)) = state.users.get_mut(&order.buyer_id) {
            *buyer = buyer.with_deposit(deposit);
        }
        Ok(PurchaseOutcome::Committed {
            deposit,
            amount_available,
        })
    }
}
