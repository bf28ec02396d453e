//! Bearer-token authentication for HTTP handlers.
//!
//! [`Authenticated`] runs the first two pipeline stages (verify the token,
//! resolve the principal) before a handler body executes. The token is read
//! from `Authorization: Bearer <token>` and, failing that, from a `jwt`
//! cookie.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, RequestContext};
use crate::middleware::request_id::record_user;

use super::state::HttpState;

/// Cookie consulted when no `Authorization` header is present.
pub const TOKEN_COOKIE: &str = "jwt";

const BEARER_PREFIX: &str = "bearer ";

/// Request context for an authenticated principal.
#[derive(Debug, Clone)]
pub struct Authenticated(pub RequestContext);

impl Authenticated {
    /// Unwrap the context.
    pub fn into_inner(self) -> RequestContext {
        self.0
    }
}

/// Extract the raw token from the request, if any.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_at_checked(BEARER_PREFIX.len())?;
            scheme
                .eq_ignore_ascii_case(BEARER_PREFIX)
                .then(|| token.trim().to_owned())
        });
    from_header.or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_owned()))
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state not configured"))?;
            let context = state.authorizer.authenticate(token).await?;
            record_user(context.principal().id());
            Ok(Self(context))
        })
    }
}
