//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a migration
//! changes the schema, update this file by hand or regenerate it with
//! `diesel print-schema`.

diesel::table! {
    /// Registered accounts.
    ///
    /// `deposit` is stored in the smallest coin unit and constrained to a
    /// non-negative multiple of 5.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Current balance.
        deposit -> Int8,
        /// `ADMIN`, `BUYER` or `SELLER`.
        role -> Varchar,
    }
}

diesel::table! {
    /// Products listed by sellers.
    products (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Units in stock; never negative.
        available_amount -> Int8,
        /// Unit price; positive multiple of 5.
        cost -> Int8,
        /// Owning seller.
        seller_id -> Uuid,
    }
}

diesel::joinable!(products -> users (seller_id));

diesel::allow_tables_to_appear_in_same_query!(products, users);
