//! Catalogue handlers.
//!
//! ```text
//! POST /product {"amountAvailable":10,"cost":25,"productName":"Cola"}
//! PUT /product/{id} {"productName":"Diet Cola","cost":30}
//! DELETE /product/{id}
//! GET /product/list
//! GET /product/{id}
//! ```
//!
//! Register [`list_products`] before [`get_product`] so `list` is not read
//! as an identifier.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::{ListingChanges, NewListing};
use crate::domain::{Capability, Error, Product};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Body for `POST /product`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[schema(example = 10)]
    pub amount_available: i64,
    #[schema(example = 25)]
    pub cost: i64,
    #[schema(example = "Cola")]
    pub product_name: String,
}

impl From<CreateProductRequest> for NewListing {
    fn from(value: CreateProductRequest) -> Self {
        Self {
            amount_available: value.amount_available,
            cost: value.cost,
            name: value.product_name,
        }
    }
}

/// Body for `PUT /product/{id}`. Blank names and invalid costs are ignored.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[schema(example = "Diet Cola")]
    pub product_name: Option<String>,
    #[schema(example = 30)]
    pub cost: Option<i64>,
}

impl From<UpdateProductRequest> for ListingChanges {
    fn from(value: UpdateProductRequest) -> Self {
        Self {
            name: value.product_name,
            cost: value.cost,
        }
    }
}

/// List a new product owned by the calling seller.
#[utoipa::path(
    post,
    path = "/product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product listed", body = Product),
        (status = 400, description = "Invalid listing", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a seller", body = Error)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/product")]
pub async fn create_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    payload: web::Json<CreateProductRequest>,
) -> ApiResult<HttpResponse> {
    let context = auth.into_inner();
    let seller = context.require(Capability::IsSeller)?;
    let product = state
        .catalog
        .create_product(seller, payload.into_inner().into())
        .await?;
    info!(product_id = %product.id(), seller_id = %seller.id(), "product listed");
    Ok(HttpResponse::Created().json(product))
}

/// Rename or reprice a product owned by the calling seller.
#[utoipa::path(
    put,
    path = "/product/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product after the update", body = Product),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owning seller", body = Error),
        (status = 404, description = "Product not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/product/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
    payload: web::Json<UpdateProductRequest>,
) -> ApiResult<web::Json<Product>> {
    let context = auth.into_inner();
    context.require(Capability::IsSeller)?;
    let context = state
        .authorizer
        .resolve_product(context, &path.into_inner(), None)
        .await?;
    let scope = context.require_scope()?;
    let product = state
        .catalog
        .update_product(context.principal(), &scope.product, payload.into_inner().into())
        .await?;
    Ok(web::Json(product))
}

/// Remove a product owned by the calling seller.
#[utoipa::path(
    delete,
    path = "/product/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 204, description = "Product removed"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the owning seller", body = Error),
        (status = 404, description = "Product not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/product/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let context = auth.into_inner();
    context.require(Capability::IsSeller)?;
    let context = state
        .authorizer
        .resolve_product(context, &path.into_inner(), None)
        .await?;
    let scope = context.require_scope()?;
    state
        .catalog
        .delete_product(context.principal(), &scope.product)
        .await?;
    info!(product_id = %scope.product.id(), "product removed");
    Ok(HttpResponse::NoContent().finish())
}

/// Every readable product.
#[utoipa::path(
    get,
    path = "/product/list",
    responses(
        (status = 200, description = "Products", body = [Product]),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security([])
)]
#[get("/product/list")]
pub async fn list_products(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Product>>> {
    Ok(web::Json(state.catalog_query.list_products().await?))
}

/// A single product.
#[utoipa::path(
    get,
    path = "/product/{id}",
    params(("id" = String, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security([])
)]
#[get("/product/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Product>> {
    Ok(web::Json(
        state.catalog_query.find_product(&path.into_inner()).await?,
    ))
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
