//! Tests for the authorization pipeline.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::{AccountStoreError, MockAccountStore, MockTokenIssuer};
use crate::domain::service_test_helpers::{buyer, product_of, seller, user};
use crate::domain::{AccessClaims, ErrorCode};

fn claims_for(user: &User) -> AccessClaims {
    AccessClaims::for_user(user, 0, 600)
}

fn pipeline(
    store: MockAccountStore,
    tokens: MockTokenIssuer,
) -> AuthorizationPipeline<MockAccountStore, MockTokenIssuer> {
    AuthorizationPipeline::new(Arc::new(store), Arc::new(tokens))
}

#[rstest]
#[case(None)]
#[case(Some(String::new()))]
#[case(Some("   ".to_owned()))]
#[tokio::test]
async fn missing_token_is_unauthorized_without_lookups(#[case] bearer: Option<String>) {
    let mut store = MockAccountStore::new();
    store.expect_find_user().times(0);
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().times(0);

    let error = pipeline(store, tokens)
        .authenticate(bearer)
        .await
        .expect_err("missing token");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[case(TokenError::expired(), "token expired")]
#[case(TokenError::not_yet_valid(), "token not yet valid")]
#[case(TokenError::malformed("bad signature"), "invalid token")]
#[tokio::test]
async fn rejected_tokens_stop_the_chain(#[case] failure: TokenError, #[case] message: &str) {
    let mut store = MockAccountStore::new();
    store.expect_find_user().times(0);
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().times(1).return_once(move |_| Err(failure));

    let error = pipeline(store, tokens)
        .authenticate(Some("token".to_owned()))
        .await
        .expect_err("rejected token");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), message);
}

#[tokio::test]
async fn unparsable_subject_is_unauthorized() {
    let mut store = MockAccountStore::new();
    store.expect_find_user().times(0);
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(|_| {
        Ok(AccessClaims {
            sub: String::new(),
            username: "ghost".to_owned(),
            exp: 600,
            nbf: 0,
        })
    });

    let error = pipeline(store, tokens)
        .authenticate(Some("token".to_owned()))
        .await
        .expect_err("no subject");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn unknown_principal_is_unauthorized() {
    let principal = buyer(0);
    let claims = claims_for(&principal);
    let mut store = MockAccountStore::new();
    store.expect_find_user().times(1).return_once(|_| Ok(None));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(move |_| Ok(claims));

    let error = pipeline(store, tokens)
        .authenticate(Some("token".to_owned()))
        .await
        .expect_err("unknown principal");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn store_outage_surfaces_as_service_unavailable() {
    let principal = buyer(0);
    let claims = claims_for(&principal);
    let mut store = MockAccountStore::new();
    store
        .expect_find_user()
        .return_once(|_| Err(AccountStoreError::connection("refused")));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(move |_| Ok(claims));

    let error = pipeline(store, tokens)
        .authenticate(Some("token".to_owned()))
        .await
        .expect_err("store down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn verified_token_resolves_principal() {
    let principal = buyer(30);
    let claims = claims_for(&principal);
    let expected_id = *principal.id();
    let stored = principal.clone();
    let mut store = MockAccountStore::new();
    store
        .expect_find_user()
        .withf(move |id| *id == expected_id)
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(move |_| Ok(claims));

    let context = pipeline(store, tokens)
        .authenticate(Some("token".to_owned()))
        .await
        .expect("authenticated");

    assert_eq!(context.principal(), &principal);
    assert!(context.scope().is_none());
    assert!(context.quantity().is_none());
}

#[rstest]
#[case(Role::Buyer, Capability::IsBuyer, true)]
#[case(Role::Buyer, Capability::IsSeller, false)]
#[case(Role::Seller, Capability::IsSeller, true)]
#[case(Role::Seller, Capability::IsBuyer, false)]
#[case(Role::Admin, Capability::IsBuyer, false)]
#[case(Role::Admin, Capability::IsSeller, false)]
fn role_gate_matches_roles(
    #[case] role: Role,
    #[case] capability: Capability,
    #[case] allowed: bool,
) {
    let context = RequestContext::for_principal(user("someone@example", role, 0));
    match context.require(capability) {
        Ok(principal) => {
            assert!(allowed);
            assert_eq!(principal.role(), role);
        }
        Err(error) => {
            assert!(!allowed);
            assert_eq!(error.code(), ErrorCode::Forbidden);
        }
    }
}

#[rstest]
fn deposit_request_reads_the_attached_coin() {
    let principal = buyer(0);
    let context = RequestContext::for_principal(principal.clone()).with_coin_value(50);

    let (resolved, coin_value) = context.deposit_request().expect("buyer with coin");

    assert_eq!(resolved, &principal);
    assert_eq!(coin_value, 50);
    assert_eq!(context.coin_value(), Some(50));
}

#[rstest]
fn deposit_request_gates_role_before_coin() {
    let context = RequestContext::for_principal(seller());
    let error = context.deposit_request().expect_err("sellers cannot deposit");
    assert_eq!(error.code(), ErrorCode::Forbidden);

    let error = RequestContext::for_principal(buyer(0))
        .deposit_request()
        .expect_err("no coin attached");
    assert_eq!(error.reason(), Some("invalid_coin"));
}

#[rstest]
fn role_gate_rejects_repeatedly() {
    let context = RequestContext::for_principal(buyer(100));
    for _ in 0..5 {
        let error = context
            .require(Capability::IsSeller)
            .expect_err("buyers are never sellers");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }
}

#[rstest]
#[case(Some("3"), Some(3))]
#[case(Some("abc"), None)]
#[case(Some("0"), None)]
#[case(None, None)]
#[tokio::test]
async fn resolve_product_attaches_scope_and_lenient_quantity(
    #[case] raw_quantity: Option<&str>,
    #[case] expected: Option<u64>,
) {
    let owner = seller();
    let product = product_of(&owner, 5, 10);
    let product_id = product.id().to_string();
    let stored_product = product.clone();
    let stored_owner = owner.clone();
    let mut store = MockAccountStore::new();
    store
        .expect_find_product()
        .times(1)
        .return_once(move |_| Ok(Some(stored_product)));
    store
        .expect_find_user()
        .times(1)
        .return_once(move |_| Ok(Some(stored_owner)));

    let context = pipeline(store, MockTokenIssuer::new())
        .resolve_product(
            RequestContext::for_principal(buyer(30)),
            &product_id,
            raw_quantity,
        )
        .await
        .expect("resolved");

    let scope = context.require_scope().expect("scope attached");
    assert_eq!(scope.product, product);
    assert_eq!(scope.owner, owner);
    assert_eq!(context.quantity().map(Quantity::value), expected);
}

#[rstest]
#[case("not-a-uuid")]
#[case("")]
#[tokio::test]
async fn malformed_product_id_is_not_found(#[case] raw: &str) {
    let mut store = MockAccountStore::new();
    store.expect_find_product().times(0);

    let error = pipeline(store, MockTokenIssuer::new())
        .resolve_product(RequestContext::for_principal(buyer(0)), raw, None)
        .await
        .expect_err("bad id");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let mut store = MockAccountStore::new();
    store.expect_find_product().return_once(|_| Ok(None));
    store.expect_find_user().times(0);

    let error = pipeline(store, MockTokenIssuer::new())
        .resolve_product(
            RequestContext::for_principal(buyer(0)),
            &ProductId::random().to_string(),
            Some("1"),
        )
        .await
        .expect_err("missing product");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn missing_owner_is_not_found() {
    let product = product_of(&seller(), 5, 1);
    let product_id = product.id().to_string();
    let mut store = MockAccountStore::new();
    store
        .expect_find_product()
        .return_once(move |_| Ok(Some(product)));
    store.expect_find_user().return_once(|_| Ok(None));

    let error = pipeline(store, MockTokenIssuer::new())
        .resolve_product(RequestContext::for_principal(buyer(0)), &product_id, None)
        .await
        .expect_err("orphaned product");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), "product owner not found");
}
