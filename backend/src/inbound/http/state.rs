//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountStore, CatalogCommand, CatalogQuery, CredentialVerifier, DepositCommand,
    LoginService, PurchaseCommand, RegistrationCommand, RequestAuthorizer, TokenIssuer,
};
use crate::domain::{
    AccountService, AuthorizationPipeline, CatalogService, DepositService, PurchaseService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationCommand>,
    pub authorizer: Arc<dyn RequestAuthorizer>,
    pub deposits: Arc<dyn DepositCommand>,
    pub purchases: Arc<dyn PurchaseCommand>,
    pub catalog: Arc<dyn CatalogCommand>,
    pub catalog_query: Arc<dyn CatalogQuery>,
    pub tokens: Arc<dyn TokenIssuer>,
}

impl HttpState {
    /// Wire the domain services over the three driven adapters.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use backend::inbound::http::state::HttpState;
    /// use backend::outbound::security::{JwtTokenService, TokenSettings};
    /// use backend::test_support::{InMemoryAccountStore, PlainCredentialVerifier};
    /// use jsonwebtoken::Algorithm;
    ///
    /// let settings = TokenSettings::new(vec![7; 32], Algorithm::HS256, Duration::from_secs(600));
    /// let state = HttpState::from_adapters(
    ///     Arc::new(InMemoryAccountStore::new()),
    ///     Arc::new(PlainCredentialVerifier),
    ///     Arc::new(JwtTokenService::from_settings(&settings)),
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn from_adapters<S, H, T>(store: Arc<S>, credentials: Arc<H>, tokens: Arc<T>) -> Self
    where
        S: AccountStore + 'static,
        H: CredentialVerifier + 'static,
        T: TokenIssuer + 'static,
    {
        let accounts = Arc::new(AccountService::new(store.clone(), credentials));
        let catalog = Arc::new(CatalogService::new(store.clone()));
        Self {
            login: accounts.clone(),
            registration: accounts,
            authorizer: Arc::new(AuthorizationPipeline::new(store.clone(), tokens.clone())),
            deposits: Arc::new(DepositService::new(store.clone())),
            purchases: Arc::new(PurchaseService::new(store)),
            catalog: catalog.clone(),
            catalog_query: catalog,
            tokens,
        }
    }
}
