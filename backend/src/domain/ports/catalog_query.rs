//! Driving port for public catalogue reads.

use async_trait::async_trait;

use crate::domain::{Error, Product};

/// Domain use-case port for browsing products.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Every product that could be read.
    async fn list_products(&self) -> Result<Vec<Product>, Error>;

    /// A single product by its textual id.
    async fn find_product(&self, product_id: &str) -> Result<Product, Error>;
}
