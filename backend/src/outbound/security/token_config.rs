//! Token configuration parsing and validation.
//!
//! Reads the JWT signing key, algorithm and lifetime from the environment.
//! Debug builds fall back to defaults with a warning; release builds reject
//! invalid values and refuse to start without a key unless
//! `JWT_ALLOW_EPHEMERAL` opts in to a random per-process key.

use std::path::PathBuf;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use mockable::Env;
use rand::RngCore;
use tracing::warn;
use zeroize::Zeroizing;

const KEY_ENV: &str = "JWT_SIGNKEY";
const KEY_FILE_ENV: &str = "JWT_SIGNKEY_FILE";
const ALGORITHM_ENV: &str = "JWT_ALG";
const TTL_ENV: &str = "JWT_TTL_SECONDS";
const ALLOW_EPHEMERAL_ENV: &str = "JWT_ALLOW_EPHEMERAL";
const KEY_DEFAULT_PATH: &str = "/var/run/secrets/jwt_signkey";
const KEY_MIN_LEN: usize = 32;
const EPHEMERAL_KEY_LEN: usize = 64;
const DEFAULT_TTL: Duration = Duration::from_secs(600);
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const ALGORITHM_EXPECTED: &str = "HS256|HS384|HS512";
const TTL_EXPECTED: &str = "a positive number of seconds";

/// Build mode for token configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings.
    Debug,
    /// Release builds require explicit, valid settings.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::outbound::security::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated token settings.
pub struct TokenSettings {
    key: Zeroizing<Vec<u8>>,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenSettings {
    /// Assemble settings from explicit values.
    pub fn new(key: Vec<u8>, algorithm: Algorithm, ttl: Duration) -> Self {
        Self {
            key: Zeroizing::new(key),
            algorithm,
            ttl,
        }
    }

    /// HMAC signing key.
    pub fn key(&self) -> &[u8] {
        self.key.as_slice()
    }

    /// Signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the key file failed.
    #[error("failed to read JWT signing key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configured key is too short for release builds.
    #[error("JWT signing key too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort { length: usize, min_len: usize },
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use backend::outbound::security::token_config::{token_settings_from_env, BuildMode};
/// use jsonwebtoken::Algorithm;
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "JWT_SIGNKEY" => Some("k".repeat(32)),
///     "JWT_ALG" => Some("HS512".to_owned()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release)?;
/// assert_eq!(settings.algorithm(), Algorithm::HS512);
/// assert_eq!(settings.ttl().as_secs(), 600);
/// # Ok(())
/// # }
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let algorithm = algorithm_from_env(env, mode)?;
    let ttl = ttl_from_env(env, mode)?;
    let allow_ephemeral = allow_ephemeral_from_env(env, mode)?;
    let key = signing_key_from_env(env, mode, allow_ephemeral)?;

    Ok(TokenSettings {
        key,
        algorithm,
        ttl,
    })
}

/// Report an invalid value: warn and fall back in debug, fail in release.
fn invalid_or_default<T>(
    mode: BuildMode,
    name: &'static str,
    value: String,
    expected: &'static str,
    default: T,
) -> Result<T, TokenConfigError> {
    if mode.is_debug() {
        warn!(variable = name, value = %value, "invalid token setting; using default");
        Ok(default)
    } else {
        Err(TokenConfigError::InvalidEnv {
            name,
            value,
            expected,
        })
    }
}

fn algorithm_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Algorithm, TokenConfigError> {
    let Some(value) = env.string(ALGORITHM_ENV) else {
        return Ok(Algorithm::HS256);
    };
    match value.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => invalid_or_default(
            mode,
            ALGORITHM_ENV,
            value,
            ALGORITHM_EXPECTED,
            Algorithm::HS256,
        ),
    }
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Duration, TokenConfigError> {
    let Some(value) = env.string(TTL_ENV) else {
        return Ok(DEFAULT_TTL);
    };
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => invalid_or_default(mode, TTL_ENV, value, TTL_EXPECTED, DEFAULT_TTL),
    }
}

fn allow_ephemeral_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(ALLOW_EPHEMERAL_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => invalid_or_default(mode, ALLOW_EPHEMERAL_ENV, value, BOOL_EXPECTED, false),
    }
}

fn checked_key(
    bytes: Zeroizing<Vec<u8>>,
    mode: BuildMode,
) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    let length = bytes.len();
    if mode == BuildMode::Release && length < KEY_MIN_LEN {
        return Err(TokenConfigError::KeyTooShort {
            length,
            min_len: KEY_MIN_LEN,
        });
    }
    Ok(bytes)
}

fn signing_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    if let Some(raw) = env.string(KEY_ENV).filter(|raw| !raw.is_empty()) {
        return checked_key(Zeroizing::new(raw.into_bytes()), mode);
    }

    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| KEY_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(bytes) => checked_key(Zeroizing::new(bytes), mode),
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary JWT signing key (dev only)"
                );
                let mut key = Zeroizing::new(vec![0_u8; EPHEMERAL_KEY_LEN]);
                rand::thread_rng().fill_bytes(key.as_mut_slice());
                Ok(key)
            } else {
                Err(TokenConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "token_config_tests.rs"]
mod tests;
