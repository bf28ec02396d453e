//! Driving port for purchases.

use async_trait::async_trait;

use crate::domain::{Error, Product, PurchaseReceipt, Quantity, User};

/// Domain use-case port for buying products.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseCommand: Send + Sync {
    /// Buy `quantity` units of `product` with `buyer`'s balance.
    async fn buy(
        &self,
        buyer: &User,
        product: &Product,
        quantity: Quantity,
    ) -> Result<PurchaseReceipt, Error>;
}
