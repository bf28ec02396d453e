//! Argon2id implementation of the `CredentialVerifier` port.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::ports::{CredentialError, CredentialHash, CredentialVerifier};

/// Hashes passwords into PHC strings with a fresh random salt per hash.
#[derive(Clone, Default)]
pub struct Argon2CredentialVerifier {
    hasher: Argon2<'static>,
}

impl Argon2CredentialVerifier {
    /// Use explicit Argon2id cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Hashing`] when the parameters are outside
    /// the ranges Argon2 accepts.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| CredentialError::hashing(err.to_string()))?;
        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl CredentialVerifier for Argon2CredentialVerifier {
    fn hash(&self, secret: &str) -> Result<CredentialHash, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| CredentialHash::new(hash.to_string()))
            .map_err(|err| CredentialError::hashing(err.to_string()))
    }

    fn verify(&self, secret: &str, hash: &CredentialHash) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash.as_str())
            .map_err(|err| CredentialError::malformed_hash(err.to_string()))?;
        match self.hasher.verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialError::malformed_hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Hashing uses minimal cost parameters to keep the suite fast.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn verifier() -> Argon2CredentialVerifier {
        Argon2CredentialVerifier::with_params(8, 1, 1).expect("valid params")
    }

    #[rstest]
    fn hash_produces_argon2id_phc_string(verifier: Argon2CredentialVerifier) {
        let hash = verifier.hash("mhG2P*&UksdfLK").expect("hashed");
        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(!hash.as_str().contains("mhG2P*&UksdfLK"));
    }

    #[rstest]
    fn same_secret_hashes_differently(verifier: Argon2CredentialVerifier) {
        let first = verifier.hash("mhG2P*&UksdfLK").expect("hashed");
        let second = verifier.hash("mhG2P*&UksdfLK").expect("hashed");
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("mhG2P*&UksdfLK", true)]
    #[case("mhG2P*&Uksdflk", false)]
    #[case("", false)]
    fn verify_matches_only_the_original(
        verifier: Argon2CredentialVerifier,
        #[case] attempt: &str,
        #[case] expected: bool,
    ) {
        let hash = verifier.hash("mhG2P*&UksdfLK").expect("hashed");
        assert_eq!(verifier.verify(attempt, &hash).expect("verifiable"), expected);
    }

    #[rstest]
    fn malformed_hash_is_an_error(verifier: Argon2CredentialVerifier) {
        let error = verifier
            .verify("anything", &CredentialHash::new("plaintext"))
            .expect_err("not a PHC string");
        assert!(matches!(error, CredentialError::MalformedHash { .. }));
    }

    #[rstest]
    fn out_of_range_params_are_rejected() {
        assert!(Argon2CredentialVerifier::with_params(1, 1, 1).is_err());
    }
}
