//! Transport-agnostic failures raised by the vending domain.
//!
//! Services build these from port failures and rule checks; the HTTP adapter
//! picks a status from [`ErrorCode`] and serialises the rest as JSON.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Failure category, serialised in `snake_case`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    /// Username already registered.
    Conflict,
    /// Well-formed request refused by a stock or deposit rule.
    BusinessRule,
    ServiceUnavailable,
    InternalError,
}

/// Error body shared by every endpoint.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("product not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "product not found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct Error {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "coin value not allowed")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// The `details.code` string, if one was attached.
    pub fn reason(&self) -> Option<&str> {
        self.details.as_ref()?.get("code")?.as_str()
    }

    /// Replace the details object.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "cost" }));
    /// assert_eq!(err.details(), Some(&json!({ "field": "cost" })));
    /// ```
    pub fn with_details(self, details: Value) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// Tag the error with a machine-readable reason under `details.code`.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Error;
    ///
    /// let err = Error::business_rule("no availability").with_reason("insufficient_stock");
    /// assert_eq!(err.reason(), Some("insufficient_stock"));
    /// ```
    pub fn with_reason(self, reason: &str) -> Self {
        self.with_details(json!({ "code": reason }))
    }
}

macro_rules! shorthand {
    ($($(#[$doc:meta])* $name:ident => $code:ident;)+) => {
        impl Error {
            $(
                $(#[$doc])*
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorCode::$code, message)
                }
            )+
        }
    };
}

shorthand! {
    /// Validation failure (400).
    invalid_request => InvalidRequest;
    /// Missing or rejected credentials (401).
    unauthorized => Unauthorized;
    /// Wrong role or not the owner (403).
    forbidden => Forbidden;
    /// Unknown user or product (404).
    not_found => NotFound;
    /// Username already taken (409).
    conflict => Conflict;
    /// Stock or deposit rule refused the operation (422).
    business_rule => BusinessRule;
    /// Store unreachable or timed out (503).
    service_unavailable => ServiceUnavailable;
    /// Anything else; redacted before leaving the process (500).
    internal => InternalError;
}
