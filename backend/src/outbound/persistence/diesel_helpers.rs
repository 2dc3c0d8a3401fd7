//! Shared error translation for the Diesel repository adapters.
//!
//! Every port error enum exposes the same `connection`/`query`
//! constructors, so the adapters funnel pool and Diesel failures through
//! one pair of generic mapping functions instead of repeating the match
//! per repository.

use tracing::debug;

use crate::domain::ports::{
    EmployeePersistenceError, ExpensePersistenceError, InvoicePersistenceError,
    PasswordResetPersistenceError, ProjectPersistenceError, UserPersistenceError,
};

use super::pool::PoolError;

diesel::define_sql_function! {
    /// PostgreSQL `lower()`, used for case-insensitive uniqueness lookups.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Implemented by every persistence port error so pool and Diesel
/// failures map uniformly.
pub(crate) trait PersistencePortError {
    fn connection_error(message: String) -> Self;
    fn query_error(message: String) -> Self;
}

macro_rules! impl_persistence_port_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl PersistencePortError for $error {
                fn connection_error(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_error(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

impl_persistence_port_error!(
    UserPersistenceError,
    EmployeePersistenceError,
    ProjectPersistenceError,
    ExpensePersistenceError,
    InvoicePersistenceError,
    PasswordResetPersistenceError,
);

/// Pool failures always mean the database was unreachable.
pub(crate) fn map_pool_error<E: PersistencePortError>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            E::connection_error(message)
        }
    }
}

/// Translate a Diesel error into the port's error type.
///
/// Connection loss maps to `Connection`; everything else, including
/// constraint violations, maps to `Query`. Constraint violations never
/// reach this point in normal operation because the handlers check
/// uniqueness before writing.
pub(crate) fn map_diesel_error<E: PersistencePortError>(error: diesel::result::Error) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => E::query_error("record not found".into()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_error("database connection error".into())
        }
        DieselError::DatabaseError(_, _) => E::query_error("database error".into()),
        _ => E::query_error("database error".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let error: UserPersistenceError = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(
            error,
            UserPersistenceError::Connection { .. }
        ));
        assert!(error.to_string().contains("refused"));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let error: ExpensePersistenceError = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(error, ExpensePersistenceError::Query { .. }));
        assert!(error.to_string().contains("record not found"));
    }

    #[rstest]
    fn rollback_maps_to_query() {
        let error: ProjectPersistenceError =
            map_diesel_error(diesel::result::Error::RollbackTransaction);
        assert!(matches!(error, ProjectPersistenceError::Query { .. }));
    }
}
