//! PostgreSQL-backed `AccountStore` implementation using Diesel ORM.
//!
//! Balance changes are single `UPDATE ... RETURNING` statements. A purchase
//! runs both conditional decrements in one transaction; a guard that matches
//! no row aborts it so neither decrement is kept.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use tracing::warn;

use crate::domain::ports::{
    AccountStore, AccountStoreError, NewUser, PurchaseOrder, PurchaseOutcome, StoredCredentials,
};
use crate::domain::ports::CredentialHash;
use crate::domain::{
    Coin, Cost, Deposit, Product, ProductId, ProductName, Role, User, UserId, Username,
};

use super::diesel_error_mapping::{map_diesel_error, map_insert_user_error, map_pool_error};
use super::models::{NewUserRow, ProductRow, ProductUpdate, UserRow};
use super::pool::DbPool;
use super::schema::{products, users};

/// Default bound applied to every store operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Diesel-backed implementation of the [`AccountStore`] port.
#[derive(Clone)]
pub struct DieselAccountStore {
    pool: DbPool,
    operation_timeout: Duration,
}

impl DieselAccountStore {
    /// Create a store over `pool` using [`DEFAULT_OPERATION_TIMEOUT`].
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Override the per-operation timeout.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Run `work` under the operation timeout. Dropping the future on expiry
    /// drops its connection, which rolls back any open transaction.
    async fn bounded<T, F>(&self, operation: &'static str, work: F) -> Result<T, AccountStoreError>
    where
        F: Future<Output = Result<T, AccountStoreError>> + Send,
    {
        tokio::time::timeout(self.operation_timeout, work)
            .await
            .unwrap_or_else(|_| {
                warn!(operation, "account store operation timed out");
                Err(AccountStoreError::timeout(operation))
            })
    }
}

fn corrupted(entity: &str, id: uuid::Uuid, detail: impl std::fmt::Display) -> AccountStoreError {
    AccountStoreError::query(format!("corrupted {entity} row {id}: {detail}"))
}

fn to_db_amount(value: u64) -> Result<i64, AccountStoreError> {
    i64::try_from(value)
        .map_err(|_| AccountStoreError::query(format!("amount {value} exceeds column range")))
}

fn row_to_user(row: UserRow) -> Result<User, AccountStoreError> {
    let UserRow {
        id,
        username,
        deposit,
        role,
    } = row;
    let username = Username::new(username).map_err(|err| corrupted("user", id, err))?;
    let deposit = u64::try_from(deposit)
        .map_err(|err| corrupted("user", id, err))
        .and_then(|value| Deposit::new(value).map_err(|err| corrupted("user", id, err)))?;
    let role = Role::from_str(&role).map_err(|err| corrupted("user", id, err))?;
    Ok(User::new(UserId::from_uuid(id), username, deposit, role))
}

fn row_to_product(row: ProductRow) -> Result<Product, AccountStoreError> {
    let ProductRow {
        id,
        name,
        available_amount,
        cost,
        seller_id,
    } = row;
    let name = ProductName::new(name).map_err(|err| corrupted("product", id, err))?;
    let cost = Cost::new(cost).map_err(|err| corrupted("product", id, err))?;
    let amount_available =
        u64::try_from(available_amount).map_err(|err| corrupted("product", id, err))?;
    Ok(Product::new(
        ProductId::from_uuid(id),
        name,
        cost,
        amount_available,
        UserId::from_uuid(seller_id),
    ))
}

/// Convert listed rows, logging and dropping any that fail validation.
fn decode_product_rows(rows: Vec<ProductRow>) -> Vec<Product> {
    rows.into_iter()
        .filter_map(|row| {
            row_to_product(row)
                .inspect_err(|error| warn!(%error, "skipping unreadable product row"))
                .ok()
        })
        .collect()
}

fn product_to_row(product: &Product) -> Result<ProductRow, AccountStoreError> {
    Ok(ProductRow {
        id: *product.id().as_uuid(),
        name: product.name().as_str().to_owned(),
        available_amount: to_db_amount(product.amount_available())?,
        cost: to_db_amount(product.cost().value())?,
        seller_id: *product.seller_id().as_uuid(),
    })
}

/// Reasons a purchase transaction is rolled back.
enum PurchaseAbort {
    StockExhausted,
    DepositExhausted,
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for PurchaseAbort {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

#[async_trait]
impl AccountStore for DieselAccountStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, AccountStoreError> {
        self.bounded("insert_user", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = NewUserRow {
                id: *user.id.as_uuid(),
                username: user.username.as_str(),
                password_hash: user.credential.as_str(),
                deposit: 0,
                role: user.role.as_str(),
            };
            let inserted: UserRow = diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_insert_user_error(err, user.username.as_str()))?;
            row_to_user(inserted)
        })
        .await
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, AccountStoreError> {
        self.bounded("find_user", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            users::table
                .filter(users::id.eq(id.as_uuid()))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .map(row_to_user)
                .transpose()
        })
        .await
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, AccountStoreError> {
        self.bounded("find_credentials", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let found: Option<(UserRow, String)> = users::table
                .filter(users::username.eq(username))
                .select((UserRow::as_select(), users::password_hash))
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            found
                .map(|(row, hash)| {
                    row_to_user(row).map(|user| StoredCredentials {
                        user,
                        credential: CredentialHash::new(hash),
                    })
                })
                .transpose()
        })
        .await
    }

    async fn credit_deposit(
        &self,
        id: &UserId,
        coin: Coin,
    ) -> Result<Option<User>, AccountStoreError> {
        self.bounded("credit_deposit", async {
            let amount = to_db_amount(coin.value())?;
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
                .set(users::deposit.eq(users::deposit + amount))
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .map(row_to_user)
                .transpose()
        })
        .await
    }

    async fn reset_deposit(&self, id: &UserId) -> Result<Option<User>, AccountStoreError> {
        self.bounded("reset_deposit", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
                .set(users::deposit.eq(0_i64))
                .returning(UserRow::as_returning())
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .map(row_to_user)
                .transpose()
        })
        .await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), AccountStoreError> {
        self.bounded("insert_product", async {
            let row = product_to_row(product)?;
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            diesel::insert_into(products::table)
                .values(&row)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(())
        })
        .await
    }

    async fn find_product(&self, id: &ProductId) -> Result<Option<Product>, AccountStoreError> {
        self.bounded("find_product", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            products::table
                .filter(products::id.eq(id.as_uuid()))
                .select(ProductRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?
                .map(row_to_product)
                .transpose()
        })
        .await
    }

    async fn update_product(&self, product: &Product) -> Result<bool, AccountStoreError> {
        self.bounded("update_product", async {
            let changes = ProductUpdate {
                name: product.name().as_str(),
                cost: to_db_amount(product.cost().value())?,
            };
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let updated = diesel::update(
                products::table
                    .filter(products::id.eq(product.id().as_uuid()))
                    .filter(products::seller_id.eq(product.seller_id().as_uuid())),
            )
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn delete_product(
        &self,
        id: &ProductId,
        seller_id: &UserId,
    ) -> Result<u64, AccountStoreError> {
        self.bounded("delete_product", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let removed = diesel::delete(
                products::table
                    .filter(products::id.eq(id.as_uuid()))
                    .filter(products::seller_id.eq(seller_id.as_uuid())),
            )
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
            Ok(removed as u64)
        })
        .await
    }

    async fn list_products(&self) -> Result<Vec<Product>, AccountStoreError> {
        self.bounded("list_products", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let rows: Vec<ProductRow> = products::table
                .select(ProductRow::as_select())
                .order_by((products::name, products::id))
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(decode_product_rows(rows))
        })
        .await
    }

    async fn commit_purchase(
        &self,
        order: &PurchaseOrder,
    ) -> Result<PurchaseOutcome, AccountStoreError> {
        let quantity = to_db_amount(order.quantity.value())?;
        let total = to_db_amount(order.total)?;
        let product_id = *order.product_id.as_uuid();
        let buyer_id = *order.buyer_id.as_uuid();

        self.bounded("commit_purchase", async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let committed: Result<(i64, i64), PurchaseAbort> = conn
                .transaction(|conn| {
                    async move {
                        let amount_available: i64 = diesel::update(
                            products::table
                                .filter(products::id.eq(product_id))
                                .filter(products::available_amount.ge(quantity)),
                        )
                        .set(products::available_amount.eq(products::available_amount - quantity))
                        .returning(products::available_amount)
                        .get_result(conn)
                        .await
                        .optional()?
                        .ok_or(PurchaseAbort::StockExhausted)?;

                        let deposit: i64 = diesel::update(
                            users::table
                                .filter(users::id.eq(buyer_id))
                                .filter(users::deposit.ge(total)),
                        )
                        .set(users::deposit.eq(users::deposit - total))
                        .returning(users::deposit)
                        .get_result(conn)
                        .await
                        .optional()?
                        .ok_or(PurchaseAbort::DepositExhausted)?;

                        Ok((deposit, amount_available))
                    }
                    .scope_boxed()
                })
                .await;

            match committed {
                Ok((deposit, amount_available)) => {
                    let deposit = u64::try_from(deposit)
                        .map_err(|err| corrupted("user", buyer_id, err))
                        .and_then(|value| {
                            Deposit::new(value).map_err(|err| corrupted("user", buyer_id, err))
                        })?;
                    let amount_available = u64::try_from(amount_available)
                        .map_err(|err| corrupted("product", product_id, err))?;
                    Ok(PurchaseOutcome::Committed {
                        deposit,
                        amount_available,
                    })
                }
                Err(PurchaseAbort::StockExhausted) => Ok(PurchaseOutcome::StockExhausted),
                Err(PurchaseAbort::DepositExhausted) => Ok(PurchaseOutcome::DepositExhausted),
                Err(PurchaseAbort::Database(error)) => Err(map_diesel_error(error)),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    fn user_row(deposit: i64, role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "buyer@example".to_owned(),
            deposit,
            role: role.to_owned(),
        }
    }

    #[rstest]
    fn user_rows_convert_to_domain_users() {
        let row = user_row(85, "BUYER");
        let id = row.id;

        let user = row_to_user(row).expect("valid row");

        assert_eq!(user.id().as_uuid(), &id);
        assert_eq!(user.deposit().value(), 85);
        assert_eq!(user.role(), Role::Buyer);
    }

    #[rstest]
    #[case(user_row(-5, "BUYER"))]
    #[case(user_row(12, "BUYER"))]
    #[case(user_row(10, "OWNER"))]
    fn corrupted_user_rows_are_query_errors(#[case] row: UserRow) {
        let error = row_to_user(row).expect_err("corrupted row");
        assert!(matches!(error, AccountStoreError::Query { .. }));
    }

    #[rstest]
    fn product_rows_round_trip() {
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: "Cola".to_owned(),
            available_amount: 4,
            cost: 25,
            seller_id: Uuid::new_v4(),
        };

        let product = row_to_product(row.clone()).expect("valid row");
        let back = product_to_row(&product).expect("fits columns");

        assert_eq!(back.id, row.id);
        assert_eq!(back.name, row.name);
        assert_eq!(back.available_amount, row.available_amount);
        assert_eq!(back.cost, row.cost);
        assert_eq!(back.seller_id, row.seller_id);
    }

    #[rstest]
    #[case(-1, 25)]
    #[case(4, 7)]
    #[case(4, 0)]
    fn corrupted_product_rows_are_rejected(#[case] available_amount: i64, #[case] cost: i64) {
        let row = ProductRow {
            id: Uuid::new_v4(),
            name: "Cola".to_owned(),
            available_amount,
            cost,
            seller_id: Uuid::new_v4(),
        };

        assert!(row_to_product(row).is_err());
    }

    fn product_row(name: &str, available_amount: i64, cost: i64) -> ProductRow {
        ProductRow {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            available_amount,
            cost,
            seller_id: Uuid::new_v4(),
        }
    }

    #[rstest]
    fn listing_skips_unreadable_rows() {
        let rows = vec![
            product_row("Cola", 4, 25),
            product_row("Odd price", 4, 7),
            product_row("Water", 0, 10),
            product_row("Negative stock", -1, 25),
            product_row("   ", 3, 5),
        ];

        let names: Vec<String> = decode_product_rows(rows)
            .iter()
            .map(|product| product.name().as_str().to_owned())
            .collect();

        assert_eq!(names, ["Cola", "Water"]);
    }

    #[rstest]
    fn listing_of_only_bad_rows_is_empty() {
        assert!(decode_product_rows(vec![product_row("Cola", -3, 0)]).is_empty());
    }

    #[rstest]
    fn amounts_beyond_bigint_are_rejected() {
        assert!(to_db_amount(u64::MAX).is_err());
        assert_eq!(to_db_amount(100).expect("fits"), 100);
    }
}
