//! Test helpers for inbound HTTP components.

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use jsonwebtoken::Algorithm;

use crate::domain::ports::TokenIssuer;
use crate::domain::{Cost, Deposit, Product, ProductId, ProductName, Role, User, UserId, Username};
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;
use crate::outbound::security::{JwtTokenService, TokenSettings};
use crate::test_support::{InMemoryAccountStore, PlainCredentialVerifier};

/// Password stored for every seeded user.
pub const SEEDED_PASSWORD: &str = "mhG2P*&UksdfLK";

/// In-memory adapters wired into a full [`HttpState`].
pub struct TestHarness {
    pub store: Arc<InMemoryAccountStore>,
    pub tokens: Arc<JwtTokenService>,
    pub state: HttpState,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryAccountStore::new());
        let settings = TokenSettings::new(
            b"0123456789abcdef0123456789abcdef".to_vec(),
            Algorithm::HS256,
            Duration::from_secs(600),
        );
        let tokens = Arc::new(JwtTokenService::from_settings(&settings));
        let state = HttpState::from_adapters(
            store.clone(),
            Arc::new(PlainCredentialVerifier),
            tokens.clone(),
        );
        Self {
            store,
            tokens,
            state,
        }
    }

    /// Store a user holding `deposit`.
    pub fn seed_user(&self, username: &str, role: Role, deposit: u64) -> User {
        let user = User::new(
            UserId::random(),
            Username::new(username).expect("valid username"),
            Deposit::new(deposit).expect("coin-aligned deposit"),
            role,
        );
        let credential = crate::domain::ports::CredentialHash::new(format!(
            "plain${SEEDED_PASSWORD}"
        ));
        self.store.seed_user(user.clone(), credential);
        user
    }

    /// Store a product owned by `seller`.
    pub fn seed_product(&self, seller: &User, stock: u64, cost: i64, name: &str) -> Product {
        let product = Product::new(
            ProductId::random(),
            ProductName::new(name).expect("valid name"),
            Cost::new(cost).expect("valid cost"),
            stock,
            *seller.id(),
        );
        self.store.seed_product(product.clone());
        product
    }

    /// Signed access token for `user`.
    pub fn token_for(&self, user: &User) -> String {
        self.tokens.issue(user).expect("token signs").into_inner()
    }

    /// Application exposing every route over this harness.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .configure(configure)
    }
}
