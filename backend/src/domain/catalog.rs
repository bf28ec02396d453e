//! Catalogue manager: seller-scoped product listings and public reads.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{
    AccountStore, CatalogCommand, CatalogQuery, ListingChanges, NewListing,
};
use crate::domain::{
    Capability, Cost, Error, Product, ProductDraft, ProductId, ProductName,
    ProductValidationError, User,
};

use super::store_errors::map_store_error;

fn map_validation_error(error: &ProductValidationError) -> Error {
    let (field, code) = match error {
        ProductValidationError::InvalidId => ("id", "invalid_id"),
        ProductValidationError::EmptyName => ("productName", "empty_name"),
        ProductValidationError::InvalidCost => ("cost", "invalid_cost"),
        ProductValidationError::EmptyStock => ("amountAvailable", "empty_stock"),
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn ensure_owner(seller: &User, product: &Product) -> Result<(), Error> {
    if product.is_owned_by(seller.id()) {
        Ok(())
    } else {
        Err(Error::forbidden("wrong seller id").with_reason("not_product_owner"))
    }
}

/// Catalogue service implementing [`CatalogCommand`] and [`CatalogQuery`].
#[derive(Clone)]
pub struct CatalogService<S> {
    store: Arc<S>,
}

impl<S> CatalogService<S> {
    /// Create a catalogue service backed by `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> CatalogCommand for CatalogService<S>
where
    S: AccountStore,
{
    async fn create_product(&self, seller: &User, listing: NewListing) -> Result<Product, Error> {
        if !Capability::IsSeller.permits(seller.role()) {
            return Err(Error::forbidden("user is not a seller"));
        }
        let draft =
            ProductDraft::try_from_parts(listing.amount_available, listing.cost, &listing.name)
                .map_err(|error| map_validation_error(&error))?;
        let product = Product::list(draft, *seller.id());
        self.store
            .insert_product(&product)
            .await
            .map_err(map_store_error)?;
        Ok(product)
    }

    async fn update_product(
        &self,
        seller: &User,
        product: &Product,
        changes: ListingChanges,
    ) -> Result<Product, Error> {
        ensure_owner(seller, product)?;

        // Invalid values are ignored rather than rejected.
        let name = changes
            .name
            .and_then(|name| ProductName::new(name).ok())
            .filter(|name| name != product.name());
        let cost = changes
            .cost
            .and_then(|cost| Cost::new(cost).ok())
            .filter(|cost| *cost != product.cost());
        if name.is_none() && cost.is_none() {
            return Ok(product.clone());
        }

        let revised = product.revised(
            name.unwrap_or_else(|| product.name().clone()),
            cost.unwrap_or_else(|| product.cost()),
        );
        let updated = self
            .store
            .update_product(&revised)
            .await
            .map_err(map_store_error)?;
        if updated {
            Ok(revised)
        } else {
            Err(Error::not_found("product not found"))
        }
    }

    async fn delete_product(&self, seller: &User, product: &Product) -> Result<(), Error> {
        ensure_owner(seller, product)?;
        let removed = self
            .store
            .delete_product(product.id(), seller.id())
            .await
            .map_err(map_store_error)?;
        if removed == 0 {
            return Err(Error::not_found("no rows deleted").with_reason("no_rows_affected"));
        }
        Ok(())
    }
}

#[async_trait]
impl<S> CatalogQuery for CatalogService<S>
where
    S: AccountStore,
{
    async fn list_products(&self) -> Result<Vec<Product>, Error> {
        self.store.list_products().await.map_err(map_store_error)
    }

    async fn find_product(&self, product_id: &str) -> Result<Product, Error> {
        let id: ProductId = product_id
            .parse()
            .map_err(|_| Error::not_found("product not found"))?;
        self.store
            .find_product(&id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("product not found"))
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
