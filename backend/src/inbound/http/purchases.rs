//! Purchase handler.
//!
//! ```text
//! GET /buy/product/9b2f3c1e-5d8a-4f0b-a1c2-7e6d5f4a3b2c/amount/5
//! ```

use actix_web::{get, web};
use tracing::info;

use crate::domain::{Capability, Error, PurchaseReceipt};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

fn missing_amount() -> Error {
    Error::invalid_request("missing amount").with_reason("missing_amount")
}

/// Buy units of a product with the buyer's balance.
///
/// An amount that is not a positive integer is reported as missing.
#[utoipa::path(
    get,
    path = "/buy/product/{id}/amount/{amount}",
    params(
        ("id" = String, Path, description = "Product identifier"),
        ("amount" = String, Path, description = "Number of units to buy")
    ),
    responses(
        (status = 200, description = "Purchase committed", body = PurchaseReceipt),
        (status = 400, description = "Missing amount", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a buyer", body = Error),
        (status = 404, description = "Product not found", body = Error),
        (status = 422, description = "Insufficient stock or deposit", body = Error)
    ),
    tags = ["purchases"],
    operation_id = "buyProduct"
)]
#[get("/buy/product/{id}/amount/{amount}")]
pub async fn buy_product(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<PurchaseReceipt>> {
    let (product_id, amount) = path.into_inner();
    let context = auth.into_inner();
    context.require(Capability::IsBuyer)?;
    let context = state
        .authorizer
        .resolve_product(context, &product_id, Some(&amount))
        .await?;
    let scope = context.require_scope()?;
    let quantity = context.quantity().ok_or_else(missing_amount)?;

    let receipt = state
        .purchases
        .buy(context.principal(), &scope.product, quantity)
        .await?;
    info!(
        user_id = %context.principal().id(),
        product_id = %receipt.product_id,
        quantity = receipt.quantity.value(),
        total_spent = receipt.total_spent,
        stock_left = receipt.amount_available,
        "purchase committed"
    );
    Ok(web::Json(receipt))
}
