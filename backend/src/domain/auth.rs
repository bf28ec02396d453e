//! Authentication primitives: login credentials and signed access claims.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use zeroize::Zeroizing;

use super::Error;
use super::user::{User, UserId};

/// Why a login body was refused before any lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
}

impl LoginValidationError {
    fn field(self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
        }
    }

    fn reason(self) -> &'static str {
        match self {
            Self::EmptyUsername => "empty_username",
            Self::EmptyPassword => "empty_password",
        }
    }
}

impl From<LoginValidationError> for Error {
    fn from(err: LoginValidationError) -> Self {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": err.field(), "code": err.reason() }))
    }
}

/// Username and password from `POST /login`.
///
/// Only emptiness is checked here. A username that breaks the registration
/// rules cannot exist, so it fails lookup like any other unknown name.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::new(" buyer@example ", "pw").expect("non-empty");
/// assert_eq!(creds.username(), "buyer@example");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn new(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        match (username.is_empty(), password.is_empty()) {
            (true, _) => Err(LoginValidationError::EmptyUsername),
            (false, true) => Err(LoginValidationError::EmptyPassword),
            (false, false) => Ok(Self {
                username: username.to_owned(),
                password: Zeroizing::new(password.to_owned()),
            }),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Claim set carried by an access token.
///
/// Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the authenticated user's id, as a UUID string.
    pub sub: String,
    pub username: String,
    /// Expiry.
    pub exp: i64,
    /// Not valid before.
    pub nbf: i64,
}

impl AccessClaims {
    /// Claims for `user`, valid from `issued_at` for `ttl_seconds`.
    pub fn for_user(user: &User, issued_at: i64, ttl_seconds: i64) -> Self {
        Self {
            sub: user.id().to_string(),
            username: user.username().to_string(),
            exp: issued_at.saturating_add(ttl_seconds),
            nbf: issued_at,
        }
    }

    /// Subject identifier, if it parses as a user id.
    pub fn subject(&self) -> Option<UserId> {
        UserId::new(&self.sub).ok()
    }
}

/// Encoded bearer token handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Take ownership of the encoded form.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignedToken(<redacted>)")
    }
}
