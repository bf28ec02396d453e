//! Account handlers: login, registration and the current principal.
//!
//! ```text
//! POST /login {"username":"buyer@example","password":"mhG2P*&UksdfLK"}
//! POST /user {"username":"buyer@example","password":"mhG2P*&UksdfLK","role":"BUYER"}
//! GET /user
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::ports::RegistrationRequest;
use crate::domain::{Error, LoginCredentials, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "buyer@example")]
    pub username: String,
    #[schema(example = "mhG2P*&UksdfLK")]
    pub password: String,
}

impl LoginRequest {
    fn credentials(&self) -> Result<LoginCredentials, Error> {
        Ok(LoginCredentials::new(&self.username, &self.password)?)
    }
}

/// Signed access token returned by `POST /login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Registration body for `POST /user`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "buyer@example")]
    pub username: String,
    #[schema(example = "mhG2P*&UksdfLK")]
    pub password: String,
    #[schema(example = "BUYER")]
    pub role: String,
}

impl From<CreateUserRequest> for RegistrationRequest {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            username: value.username,
            password: value.password,
            role: value.role,
        }
    }
}

/// Verify credentials and issue a signed access token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials = payload.credentials()?;
    let user = state.login.authenticate(&credentials).await?;
    let token = state.tokens.issue(&user).map_err(|err| {
        error!(error = %err, user_id = %user.id(), "failed to sign access token");
        Error::internal("token signing failed")
    })?;
    info!(user_id = %user.id(), "user logged in");
    Ok(web::Json(TokenResponse {
        token: token.into_inner(),
    }))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username taken", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/user")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.registration.register(payload.into_inner().into()).await?;
    info!(user_id = %user.id(), role = %user.role(), "user registered");
    Ok(HttpResponse::Created().json(user))
}

/// Show the authenticated principal.
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(auth: Authenticated) -> ApiResult<web::Json<User>> {
    Ok(web::Json(auth.into_inner().principal().clone()))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
