//! Driven port for hashing and verifying account passwords.

use std::fmt;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential verifier adapters.
    pub enum CredentialError {
        /// Producing a hash failed.
        Hashing { message: String } => "credential hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored credential hash is malformed: {message}",
    }
}

/// Opaque stored password hash. Never serialised outward.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Borrow the encoded hash for storage or verification.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Port for one-way password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    /// Hash a plaintext secret for storage.
    fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError>;

    /// Whether `secret` matches `hash`. A mismatch is `Ok(false)`.
    fn verify(&self, secret: &str, hash: &CredentialHash) -> Result<bool, CredentialError>;
}
