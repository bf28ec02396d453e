//! Driving port for seller-side catalogue changes.

use async_trait::async_trait;

use crate::domain::{Error, Product, User};

/// Raw listing inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub amount_available: i64,
    pub cost: i64,
    pub name: String,
}

/// Requested edits; each field is applied only when it is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingChanges {
    pub name: Option<String>,
    pub cost: Option<i64>,
}

/// Domain use-case port for creating, editing and removing listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    /// List a new product owned by `seller`.
    async fn create_product(&self, seller: &User, listing: NewListing) -> Result<Product, Error>;

    /// Apply `changes` to a product owned by `seller`.
    async fn update_product(
        &self,
        seller: &User,
        product: &Product,
        changes: ListingChanges,
    ) -> Result<Product, Error>;

    /// Remove a product owned by `seller`.
    async fn delete_product(&self, seller: &User, product: &Product) -> Result<(), Error>;
}
