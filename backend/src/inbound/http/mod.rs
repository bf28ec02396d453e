//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod deposits;
pub mod error;
pub mod health;
pub mod products;
pub mod purchases;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register the account, deposit, purchase and catalogue routes.
///
/// Health probes are mounted separately because they read
/// [`health::HealthState`] rather than [`state::HttpState`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::create_user)
        .service(users::current_user)
        .service(deposits::deposit_coin)
        .service(deposits::reset_deposit)
        .service(purchases::buy_product)
        .service(products::create_product)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::update_product)
        .service(products::delete_product);
}
