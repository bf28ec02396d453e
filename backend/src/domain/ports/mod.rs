//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`AccountStore`, `CredentialVerifier`, `TokenIssuer`) are
//! implemented by outbound adapters. Driving ports are implemented by the
//! domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_store;
mod catalog_command;
mod catalog_query;
mod credential_verifier;
mod deposit_command;
mod login_service;
mod purchase_command;
mod registration_command;
mod request_authorizer;
mod token_issuer;

#[cfg(test)]
pub use account_store::MockAccountStore;
pub use account_store::{
    AccountStore, AccountStoreError, NewUser, PurchaseOrder, PurchaseOutcome, StoredCredentials,
};
#[cfg(test)]
pub use catalog_command::MockCatalogCommand;
pub use catalog_command::{CatalogCommand, ListingChanges, NewListing};
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::CatalogQuery;
#[cfg(test)]
pub use credential_verifier::MockCredentialVerifier;
pub use credential_verifier::{CredentialError, CredentialHash, CredentialVerifier};
#[cfg(test)]
pub use deposit_command::MockDepositCommand;
pub use deposit_command::DepositCommand;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use purchase_command::MockPurchaseCommand;
pub use purchase_command::PurchaseCommand;
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{RegistrationCommand, RegistrationRequest};
pub use request_authorizer::RequestAuthorizer;
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
