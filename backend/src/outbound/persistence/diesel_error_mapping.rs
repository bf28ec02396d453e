//! Mapping from pool and Diesel failures to account store errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::AccountStoreError;

use super::pool::PoolError;

/// Map pool errors to account store connection errors.
pub(super) fn map_pool_error(error: PoolError) -> AccountStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            AccountStoreError::connection(message)
        }
        invalid @ PoolError::InvalidUrl { .. } => AccountStoreError::connection(invalid.to_string()),
    }
}

/// Map Diesel errors to account store errors.
///
/// Database messages are logged at debug level and never copied into the
/// returned error.
pub(super) fn map_diesel_error(error: DieselError) -> AccountStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => AccountStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => AccountStoreError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AccountStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => AccountStoreError::query("database error"),
        _ => AccountStoreError::query("database error"),
    }
}

/// Map an insert failure, treating a unique violation as a taken username.
pub(super) fn map_insert_user_error(error: DieselError, username: &str) -> AccountStoreError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            AccountStoreError::duplicate_username(username)
        }
        other => map_diesel_error(other),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for Diesel error mapping.
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct StubInfo(&'static str);

    impl diesel::result::DatabaseErrorInformation for StubInfo {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(StubInfo("secret detail from postgres")))
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, AccountStoreError::connection("timed out"));
    }

    #[rstest]
    #[case(DieselError::NotFound, AccountStoreError::query("record not found"))]
    #[case(
        database_error(DatabaseErrorKind::ClosedConnection),
        AccountStoreError::connection("database connection error")
    )]
    #[case(
        database_error(DatabaseErrorKind::CheckViolation),
        AccountStoreError::query("database error")
    )]
    fn diesel_errors_hide_database_messages(
        #[case] error: DieselError,
        #[case] expected: AccountStoreError,
    ) {
        let mapped = map_diesel_error(error);
        assert_eq!(mapped, expected);
        assert!(!mapped.to_string().contains("secret detail"));
    }

    #[rstest]
    fn unique_violation_on_insert_is_duplicate_username() {
        let mapped =
            map_insert_user_error(database_error(DatabaseErrorKind::UniqueViolation), "alice123");
        assert_eq!(mapped, AccountStoreError::duplicate_username("alice123"));
    }

    #[rstest]
    fn other_insert_failures_fall_back() {
        let mapped =
            map_insert_user_error(database_error(DatabaseErrorKind::ForeignKeyViolation), "bob");
        assert_eq!(mapped, AccountStoreError::query("database error"));
    }
}
