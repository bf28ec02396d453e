//! Shared fixtures for domain service tests.

use crate::domain::{
    Cost, Deposit, Product, ProductId, ProductName, Role, User, UserId, Username,
};

pub(crate) fn user(name: &str, role: Role, deposit: u64) -> User {
    User::new(
        UserId::random(),
        Username::new(name).expect("fixture username"),
        Deposit::new(deposit).expect("fixture deposit"),
        role,
    )
}

pub(crate) fn buyer(deposit: u64) -> User {
    user("buyer@example", Role::Buyer, deposit)
}

pub(crate) fn seller() -> User {
    user("seller@example", Role::Seller, 0)
}

pub(crate) fn product_of(owner: &User, cost: i64, amount_available: u64) -> Product {
    Product::new(
        ProductId::random(),
        ProductName::new("Cola").expect("fixture name"),
        Cost::new(cost).expect("fixture cost"),
        amount_available,
        *owner.id(),
    )
}
