//! Purchase engine.
//!
//! Checks stock first and balance second, then commits both decrements in one
//! store transaction. The change returned to the caller is the coin breakdown
//! of the buyer's remaining balance; it is informational and not persisted.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{AccountStore, PurchaseCommand, PurchaseOrder, PurchaseOutcome};
use crate::domain::{Change, Deposit, Error, Product, ProductId, Quantity, User, make_change};

use super::store_errors::map_store_error;

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    #[schema(value_type = String)]
    pub product_id: ProductId,
    #[schema(value_type = u64, example = 5)]
    pub quantity: Quantity,
    #[schema(example = 25)]
    pub total_spent: u64,
    /// Buyer's balance after the purchase.
    #[schema(value_type = u64, example = 5)]
    pub deposit: Deposit,
    /// Coin breakdown of `deposit`: counts of 5, 10, 20, 50 and 100.
    #[schema(value_type = Vec<u64>, example = json!([1, 0, 0, 0, 0]))]
    pub change: Change,
    /// Stock left after the purchase; logged, not sent to the buyer.
    #[serde(skip)]
    pub amount_available: u64,
}

fn insufficient_stock(requested: Quantity, available: u64) -> Error {
    Error::business_rule("no availability").with_details(json!({
        "code": "insufficient_stock",
        "requested": requested.value(),
        "available": available,
    }))
}

fn insufficient_deposit() -> Error {
    Error::business_rule("not enough deposit")
        .with_reason("insufficient_deposit")
}

/// Purchase service implementing [`PurchaseCommand`].
#[derive(Clone)]
pub struct PurchaseService<S> {
    store: Arc<S>,
}

impl<S> PurchaseService<S> {
    /// Create a purchase service committing through `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> PurchaseCommand for PurchaseService<S>
where
    S: AccountStore,
{
    async fn buy(
        &self,
        buyer: &User,
        product: &Product,
        quantity: Quantity,
    ) -> Result<PurchaseReceipt, Error> {
        if quantity.value() > product.amount_available() {
            return Err(insufficient_stock(quantity, product.amount_available()));
        }
        let total = product
            .cost()
            .total_for(quantity)
            .filter(|total| buyer.deposit().covers(*total))
            .ok_or_else(insufficient_deposit)?;

        let order = PurchaseOrder {
            buyer_id: *buyer.id(),
            product_id: *product.id(),
            quantity,
            total,
        };
        match self
            .store
            .commit_purchase(&order)
            .await
            .map_err(map_store_error)?
        {
            PurchaseOutcome::Committed {
                deposit,
                amount_available,
            } => Ok(PurchaseReceipt {
                product_id: *product.id(),
                quantity,
                total_spent: total,
                deposit,
                change: make_change(deposit),
                amount_available,
            }),
            PurchaseOutcome::StockExhausted => {
                Err(insufficient_stock(quantity, product.amount_available()))
            }
            PurchaseOutcome::DepositExhausted => Err(insufficient_deposit()),
        }
    }
}

#[cfg(test)]
#[path = "purchase_tests.rs"]
mod tests;
