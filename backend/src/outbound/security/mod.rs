//! Security adapters: password hashing and bearer tokens.
//!
//! - [`Argon2CredentialVerifier`] implements `CredentialVerifier` with
//!   Argon2id PHC strings.
//! - [`JwtTokenService`] implements `TokenIssuer` with HMAC-signed JWTs whose
//!   validity window is checked against an injected clock.
//! - [`token_config`] reads the signing key, algorithm and lifetime from the
//!   environment.

mod argon2_credentials;
mod jwt_tokens;
pub mod token_config;

pub use argon2_credentials::Argon2CredentialVerifier;
pub use jwt_tokens::JwtTokenService;
pub use token_config::{TokenConfigError, TokenSettings, token_settings_from_env};
