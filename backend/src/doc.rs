//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: domain views (`User`, `Product`, `PurchaseReceipt`,
//!   `Error`) and the request bodies
//! - **Security**: bearer JWT authentication scheme
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Product, PurchaseReceipt, Role, User};
use crate::inbound::http::products::{CreateProductRequest, UpdateProductRequest};
use crate::inbound::http::users::{CreateUserRequest, LoginRequest, TokenResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let scheme = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some("Access token issued by POST /login."))
            .build();
        components.add_security_scheme("BearerToken", SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Vending machine API",
        description = "Accounts, coin deposits, purchases and the product catalogue."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::current_user,
        crate::inbound::http::deposits::deposit_coin,
        crate::inbound::http::deposits::reset_deposit,
        crate::inbound::http::purchases::buy_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::health::health,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Role,
        Product,
        PurchaseReceipt,
        Error,
        ErrorCode,
        LoginRequest,
        TokenResponse,
        CreateUserRequest,
        CreateProductRequest,
        UpdateProductRequest
    )),
    tags(
        (name = "users", description = "Registration, login and the current user"),
        (name = "deposits", description = "Buyer coin balance"),
        (name = "purchases", description = "Buying products"),
        (name = "products", description = "Seller catalogue management and browsing"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
