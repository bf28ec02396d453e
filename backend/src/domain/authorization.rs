//! Request authorization pipeline.
//!
//! Stages run in order and fail closed:
//!
//! 1. verify the bearer token;
//! 2. resolve the principal named by its subject;
//! 3. gate by role ([`RequestContext::require`]);
//! 4. resolve a path-referenced product and its owner.
//!
//! Each stage adds typed values to a [`RequestContext`]; none of them write
//! to the store.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{AccountStore, RequestAuthorizer, TokenError, TokenIssuer};
use crate::domain::{Error, Product, ProductId, Quantity, Role, User};

use super::store_errors::map_store_error;

/// Role requirement attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    IsBuyer,
    IsSeller,
}

impl Capability {
    /// Whether `role` satisfies this requirement.
    pub const fn permits(self, role: Role) -> bool {
        match (self, role) {
            (Self::IsBuyer, Role::Buyer) | (Self::IsSeller, Role::Seller) => true,
            (Self::IsBuyer, Role::Admin | Role::Seller)
            | (Self::IsSeller, Role::Admin | Role::Buyer) => false,
        }
    }

    fn denial(self) -> Error {
        let (message, required) = match self {
            Self::IsBuyer => ("user is not a buyer", Role::Buyer),
            Self::IsSeller => ("user is not a seller", Role::Seller),
        };
        Error::forbidden(message).with_details(json!({
            "code": "role_required",
            "role": required.as_str(),
        }))
    }
}

/// Product referenced by the request path, with its seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductScope {
    pub product: Product,
    pub owner: User,
}

/// Values attached to a request by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    principal: User,
    scope: Option<ProductScope>,
    coin_value: Option<u64>,
    quantity: Option<Quantity>,
}

impl RequestContext {
    /// Context holding only an authenticated principal.
    pub fn for_principal(principal: User) -> Self {
        Self {
            principal,
            scope: None,
            coin_value: None,
            quantity: None,
        }
    }

    /// The authenticated user.
    pub fn principal(&self) -> &User {
        &self.principal
    }

    /// Role gate: return the principal when its role satisfies `capability`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Capability, Deposit, RequestContext, Role, User, UserId, Username};
    ///
    /// let seller = User::new(
    ///     UserId::random(),
    ///     Username::new("seller@example").unwrap(),
    ///     Deposit::ZERO,
    ///     Role::Seller,
    /// );
    /// let context = RequestContext::for_principal(seller);
    /// assert!(context.require(Capability::IsSeller).is_ok());
    /// assert!(context.require(Capability::IsBuyer).is_err());
    /// ```
    pub fn require(&self, capability: Capability) -> Result<&User, Error> {
        if capability.permits(self.principal.role()) {
            Ok(&self.principal)
        } else {
            Err(capability.denial())
        }
    }

    /// Product and owner attached by resource resolution.
    pub fn scope(&self) -> Option<&ProductScope> {
        self.scope.as_ref()
    }

    /// Like [`Self::scope`], failing when no product was resolved.
    pub fn require_scope(&self) -> Result<&ProductScope, Error> {
        self.scope()
            .ok_or_else(|| Error::not_found("product not found"))
    }

    /// Requested quantity; absent when the path value did not parse.
    pub fn quantity(&self) -> Option<Quantity> {
        self.quantity
    }

    /// Coin value supplied by the path.
    pub fn coin_value(&self) -> Option<u64> {
        self.coin_value
    }

    /// Buyer and coin for a deposit. Gates on [`Capability::IsBuyer`] and
    /// fails when no coin value was attached.
    pub fn deposit_request(&self) -> Result<(&User, u64), Error> {
        let buyer = self.require(Capability::IsBuyer)?;
        let coin_value = self
            .coin_value
            .ok_or_else(|| Error::invalid_request("coin value missing").with_reason("invalid_coin"))?;
        Ok((buyer, coin_value))
    }

    /// Attach the path-supplied coin value.
    pub fn with_coin_value(self, coin_value: u64) -> Self {
        Self {
            coin_value: Some(coin_value),
            ..self
        }
    }

    fn with_scope(self, scope: ProductScope, quantity: Option<Quantity>) -> Self {
        Self {
            scope: Some(scope),
            quantity,
            ..self
        }
    }
}

/// Pipeline implementing [`RequestAuthorizer`] over the store and token
/// issuer ports.
#[derive(Clone)]
pub struct AuthorizationPipeline<S, T> {
    store: Arc<S>,
    tokens: Arc<T>,
}

impl<S, T> AuthorizationPipeline<S, T> {
    /// Create a pipeline reading principals and products from `store`.
    pub fn new(store: Arc<S>, tokens: Arc<T>) -> Self {
        Self { store, tokens }
    }
}

fn map_token_error(error: &TokenError) -> Error {
    debug!(%error, "bearer token rejected");
    match error {
        TokenError::Expired => Error::unauthorized("token expired"),
        TokenError::NotYetValid => Error::unauthorized("token not yet valid"),
        TokenError::Malformed { .. } | TokenError::Signing { .. } => {
            Error::unauthorized("invalid token")
        }
    }
}

#[async_trait]
impl<S, T> RequestAuthorizer for AuthorizationPipeline<S, T>
where
    S: AccountStore,
    T: TokenIssuer,
{
    async fn authenticate(&self, bearer: Option<String>) -> Result<RequestContext, Error> {
        let token = bearer
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
        let claims = self
            .tokens
            .verify(&token)
            .map_err(|error| map_token_error(&error))?;
        let subject = claims
            .subject()
            .ok_or_else(|| Error::unauthorized("token subject missing"))?;
        let principal = self
            .store
            .find_user(&subject)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::unauthorized("unknown principal"))?;
        Ok(RequestContext::for_principal(principal))
    }

    async fn resolve_product(
        &self,
        context: RequestContext,
        product_id: &str,
        quantity: Option<&str>,
    ) -> Result<RequestContext, Error> {
        let id: ProductId = product_id
            .parse()
            .map_err(|_| Error::not_found("product not found"))?;
        let product = self
            .store
            .find_product(&id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("product not found"))?;
        let owner = self
            .store
            .find_user(product.seller_id())
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("product owner not found"))?;
        let quantity = quantity.and_then(Quantity::parse);
        Ok(context.with_scope(ProductScope { product, owner }, quantity))
    }
}

#[cfg(test)]
#[path = "authorization_tests.rs"]
mod tests;
