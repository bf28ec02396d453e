//! JSON error responses for the vending API.
//!
//! Every failure leaves a handler as a domain [`Error`] and is rendered as
//! `{ code, message, details? }`. Internal errors are logged in full and sent
//! to the client with a fixed message and only their `details.code` reason.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode};

/// Handler result type.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

impl ErrorCode {
    fn http_status(self) -> StatusCode {
        use ErrorCode as C;
        match self {
            C::InvalidRequest => StatusCode::BAD_REQUEST,
            C::Unauthorized => StatusCode::UNAUTHORIZED,
            C::Forbidden => StatusCode::FORBIDDEN,
            C::NotFound => StatusCode::NOT_FOUND,
            C::Conflict => StatusCode::CONFLICT,
            C::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
            C::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            C::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The body a client is allowed to see.
fn client_view(err: &Error) -> Error {
    if err.code() != ErrorCode::InternalError {
        return err.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match err.reason() {
        Some(reason) => redacted.with_reason(reason),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        self.code().http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(%status, message = self.message(), details = ?self.details(), "request failed");
        } else {
            debug!(%status, reason = ?self.reason(), "request rejected");
        }
        HttpResponse::build(status).json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced in handler");
        Error::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
mod tests;
