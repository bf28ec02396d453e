//! Account registration and credential verification.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error};

use crate::domain::ports::{
    AccountStore, CredentialError, CredentialVerifier, LoginService, NewUser,
    RegistrationCommand, RegistrationRequest,
};
use crate::domain::{
    Error, LoginCredentials, Password, Role, User, UserId, UserValidationError, Username,
};

use super::store_errors::map_store_error;

fn map_validation_error(error: &UserValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field(),
        "code": "invalid_field",
    }))
}

fn map_credential_error(error: &CredentialError) -> Error {
    error!(%error, "credential verifier failed");
    Error::internal("credential verification failed")
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Account service implementing [`RegistrationCommand`] and [`LoginService`].
#[derive(Clone)]
pub struct AccountService<S, H> {
    store: Arc<S>,
    credentials: Arc<H>,
}

impl<S, H> AccountService<S, H> {
    /// Create an account service storing users in `store` and hashing
    /// passwords with `credentials`.
    pub fn new(store: Arc<S>, credentials: Arc<H>) -> Self {
        Self { store, credentials }
    }
}

#[async_trait]
impl<S, H> RegistrationCommand for AccountService<S, H>
where
    S: AccountStore,
    H: CredentialVerifier,
{
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        let RegistrationRequest {
            username,
            password,
            role,
        } = request;
        let username = Username::new(username).map_err(|err| map_validation_error(&err))?;
        let password = Password::new(password).map_err(|err| map_validation_error(&err))?;
        let role = Role::from_str(&role).map_err(|err| map_validation_error(&err))?;

        let credential = self
            .credentials
            .hash(password.expose())
            .map_err(|err| map_credential_error(&err))?;
        let new_user = NewUser {
            id: UserId::random(),
            username,
            credential,
            role,
        };
        self.store
            .insert_user(&new_user)
            .await
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<S, H> LoginService for AccountService<S, H>
where
    S: AccountStore,
    H: CredentialVerifier,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(stored) = self
            .store
            .find_credentials(credentials.username())
            .await
            .map_err(map_store_error)?
        else {
            debug!(username = credentials.username(), "login for unknown user");
            return Err(invalid_credentials());
        };

        let matches = self
            .credentials
            .verify(credentials.password(), &stored.credential)
            .map_err(|err| map_credential_error(&err))?;
        if matches {
            Ok(stored.user)
        } else {
            debug!(username = credentials.username(), "login with wrong password");
            Err(invalid_credentials())
        }
    }
}
