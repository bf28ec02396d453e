//! Driving port for the request authorization pipeline.

use async_trait::async_trait;

use crate::domain::{Error, RequestContext};

/// Turns a bearer token into a [`RequestContext`] and scopes it to a product.
///
/// Role gates are pure checks on the context
/// ([`RequestContext::require`]) and need no port.
#[async_trait]
pub trait RequestAuthorizer: Send + Sync {
    /// Verify the token and resolve the principal it names.
    async fn authenticate(&self, bearer: Option<String>) -> Result<RequestContext, Error>;

    /// Attach the referenced product, its owner and, when it parses, the
    /// requested quantity.
    async fn resolve_product(
        &self,
        context: RequestContext,
        product_id: &str,
        quantity: Option<&str>,
    ) -> Result<RequestContext, Error>;
}
