//! Driven port for issuing and verifying signed access tokens.

use crate::domain::{AccessClaims, SignedToken, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token issuer adapters.
    pub enum TokenError {
        /// The token could not be decoded or its signature did not match.
        Malformed { message: String } => "malformed token: {message}",
        /// The token's expiry has passed.
        Expired => "token expired",
        /// The token's not-before time lies in the future.
        NotYetValid => "token not yet valid",
        /// Encoding a new token failed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Port for the signed claim set used as a bearer credential.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `user`.
    fn issue(&self, user: &User) -> Result<SignedToken, TokenError>;

    /// Check integrity, expiry and not-before, returning the claims.
    fn verify(&self, token: &str) -> Result<AccessClaims, TokenError>;
}
