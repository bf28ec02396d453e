//! HMAC-signed JWT implementation of the `TokenIssuer` port.
//!
//! `exp` and `nbf` are checked against the injected [`Clock`] rather than
//! the library's wall-clock validation so expiry behaviour is testable.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::{AccessClaims, SignedToken, User};

use super::token_config::TokenSettings;

/// Issues and verifies access tokens for authenticated users.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service using the system clock.
    pub fn from_settings(settings: &TokenSettings) -> Self {
        Self::with_clock(settings, Arc::new(DefaultClock))
    }

    /// Build a service using `clock` for issue and validity checks.
    pub fn with_clock(settings: &TokenSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.key()),
            decoding: DecodingKey::from_secret(settings.key()),
            algorithm: settings.algorithm(),
            ttl_seconds: ttl_as_seconds(settings.ttl()),
            clock,
        }
    }
}

fn ttl_as_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

impl TokenIssuer for JwtTokenService {
    fn issue(&self, user: &User) -> Result<SignedToken, TokenError> {
        let claims = AccessClaims::for_user(user, self.clock.utc().timestamp(), self.ttl_seconds);
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map(SignedToken::new)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        let claims = decode::<AccessClaims>(token, &self.decoding, &validation)
            .map_err(|err| TokenError::malformed(err.to_string()))?
            .claims;

        let now = self.clock.utc().timestamp();
        if now < claims.nbf {
            return Err(TokenError::not_yet_valid());
        }
        if now >= claims.exp {
            return Err(TokenError::expired());
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    //! Token round trips against a controllable clock.
    use super::*;
    use crate::domain::{Deposit, Role, UserId, Username};
    use crate::outbound::security::token_config::TokenSettings;
    use crate::test_support::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn settings(algorithm: Algorithm) -> TokenSettings {
        TokenSettings::new(KEY.to_vec(), algorithm, Duration::from_secs(600))
    }

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
                .single()
                .expect("valid instant"),
        ))
    }

    fn user() -> User {
        User::new(
            UserId::random(),
            Username::new("buyer@example").expect("valid username"),
            Deposit::ZERO,
            Role::Buyer,
        )
    }

    #[rstest]
    #[case(Algorithm::HS256)]
    #[case(Algorithm::HS384)]
    #[case(Algorithm::HS512)]
    fn issued_tokens_verify(clock: Arc<MutableClock>, #[case] algorithm: Algorithm) {
        let service = JwtTokenService::with_clock(&settings(algorithm), clock);
        let user = user();

        let token = service.issue(&user).expect("signed");
        let claims = service.verify(token.as_str()).expect("valid");

        assert_eq!(claims.subject(), Some(*user.id()));
        assert_eq!(claims.username, "buyer@example");
        assert_eq!(claims.exp - claims.nbf, 600);
    }

    #[rstest]
    fn tokens_expire_after_ttl(clock: Arc<MutableClock>) {
        let service = JwtTokenService::with_clock(&settings(Algorithm::HS256), clock.clone());
        let token = service.issue(&user()).expect("signed");

        clock.advance_seconds(599);
        assert!(service.verify(token.as_str()).is_ok());

        clock.advance_seconds(1);
        assert_eq!(
            service.verify(token.as_str()).expect_err("expired"),
            TokenError::expired()
        );
    }

    #[rstest]
    fn tokens_from_the_future_are_not_yet_valid(clock: Arc<MutableClock>) {
        let issuer = JwtTokenService::with_clock(&settings(Algorithm::HS256), clock.clone());
        let token = issuer.issue(&user()).expect("signed");

        clock.advance_seconds(-60);
        assert_eq!(
            issuer.verify(token.as_str()).expect_err("nbf in future"),
            TokenError::not_yet_valid()
        );
    }

    #[rstest]
    fn foreign_signatures_are_malformed(clock: Arc<MutableClock>) {
        let other = TokenSettings::new(
            b"ffffffffffffffffffffffffffffffff".to_vec(),
            Algorithm::HS256,
            Duration::from_secs(600),
        );
        let forger = JwtTokenService::with_clock(&other, clock.clone());
        let service = JwtTokenService::with_clock(&settings(Algorithm::HS256), clock);

        let token = forger.issue(&user()).expect("signed");
        let error = service.verify(token.as_str()).expect_err("bad signature");

        assert!(matches!(error, TokenError::Malformed { .. }));
    }

    #[rstest]
    fn algorithm_mismatch_is_rejected(clock: Arc<MutableClock>) {
        let issuer = JwtTokenService::with_clock(&settings(Algorithm::HS512), clock.clone());
        let service = JwtTokenService::with_clock(&settings(Algorithm::HS256), clock);

        let token = issuer.issue(&user()).expect("signed");

        assert!(service.verify(token.as_str()).is_err());
    }

    #[rstest]
    #[case("")]
    #[case("not-a-token")]
    #[case("a.b.c")]
    fn garbage_is_malformed(clock: Arc<MutableClock>, #[case] token: &str) {
        let service = JwtTokenService::with_clock(&settings(Algorithm::HS256), clock);
        assert!(matches!(
            service.verify(token).expect_err("garbage"),
            TokenError::Malformed { .. }
        ));
    }
}
