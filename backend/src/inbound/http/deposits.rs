//! Buyer balance handlers.
//!
//! ```text
//! POST /deposit/50
//! POST /reset
//! ```

use actix_web::{post, web};
use serde_json::json;
use tracing::info;

use crate::domain::{Capability, Coin, Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

fn parse_coin(raw: &str) -> Result<u64, Error> {
    raw.trim().parse::<u64>().map_err(|_| {
        Error::invalid_request("coin value must be a number").with_details(json!({
            "code": "invalid_coin",
            "value": raw,
            "accepted": Coin::accepted_values(),
        }))
    })
}

/// Insert one coin into the buyer's balance.
#[utoipa::path(
    post,
    path = "/deposit/{coin}",
    params(("coin" = String, Path, description = "Coin value: 5, 10, 20, 50 or 100")),
    responses(
        (status = 200, description = "Updated balance", body = User),
        (status = 400, description = "Coin not accepted", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a buyer", body = Error),
        (status = 500, description = "Deposit failed", body = Error)
    ),
    tags = ["deposits"],
    operation_id = "depositCoin"
)]
#[post("/deposit/{coin}")]
pub async fn deposit_coin(
    state: web::Data<HttpState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let context = auth.into_inner();
    context.require(Capability::IsBuyer)?;
    let context = context.with_coin_value(parse_coin(&path.into_inner())?);
    let (buyer, coin_value) = context.deposit_request()?;
    let updated = state.deposits.deposit_coin(buyer, coin_value).await?;
    info!(user_id = %updated.id(), coin = coin_value, deposit = %updated.deposit(), "coin deposited");
    Ok(web::Json(updated))
}

/// Set the buyer's balance to zero.
#[utoipa::path(
    post,
    path = "/reset",
    responses(
        (status = 200, description = "Balance reset", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a buyer", body = Error)
    ),
    tags = ["deposits"],
    operation_id = "resetDeposit"
)]
#[post("/reset")]
pub async fn reset_deposit(
    state: web::Data<HttpState>,
    auth: Authenticated,
) -> ApiResult<web::Json<User>> {
    let context = auth.into_inner();
    let buyer = context.require(Capability::IsBuyer)?;
    let updated = state.deposits.reset_deposit(buyer).await?;
    info!(user_id = %updated.id(), "deposit reset");
    Ok(web::Json(updated))
}
