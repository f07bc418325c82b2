//! Shared Diesel error mapping for the repository adapters.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

fn log_diesel_error(error: &diesel::result::Error) {
    use diesel::result::Error as DieselError;

    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(%error, "diesel operation failed"),
    }
}

/// Map common Diesel error variants into query/connection constructors.
///
/// `NotFound` and query-builder failures map to query errors; callers that
/// expect a missing row use `.optional()` before reaching this mapping.
pub fn map_basic_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    log_diesel_error(&error);

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Like [`map_basic_diesel_error`], but integrity violations become
/// conflicts.
///
/// Unique violations report `duplicate_key`; foreign-key violations, which
/// surface when a referenced row disappears under a concurrent delete,
/// report `reference_violation`.
pub fn map_constraint_diesel_error<E, Q, C, X>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
    conflict: X,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
    X: FnOnce(&'static str, String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            log_diesel_error(&error);
            let message = format!("duplicate key: {}", info.constraint_name().unwrap_or("unknown"));
            conflict("duplicate_key", message)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            log_diesel_error(&error);
            let message = format!(
                "reference violation: {}",
                info.constraint_name().unwrap_or("unknown")
            );
            conflict("reference_violation", message)
        }
        _ => map_basic_diesel_error(error, query, connection),
    }
}

/// Implement `From<PoolError>` and `From<diesel::result::Error>` for a
/// repository error with `Connection`/`Query`/`Conflict` variants, so `?`
/// works both outside and inside `conn.transaction` closures.
macro_rules! impl_diesel_error_conversion {
    ($error:ident) => {
        impl From<$crate::outbound::persistence::pool::PoolError> for $error {
            fn from(error: $crate::outbound::persistence::pool::PoolError) -> Self {
                $crate::outbound::persistence::diesel_basic_error_mapping::map_basic_pool_error(
                    error,
                    $error::connection,
                )
            }
        }

        impl From<diesel::result::Error> for $error {
            fn from(error: diesel::result::Error) -> Self {
                $crate::outbound::persistence::diesel_basic_error_mapping::map_constraint_diesel_error(
                    error,
                    $error::query,
                    $error::connection,
                    $error::conflict,
                )
            }
        }
    };
}

pub(crate) use impl_diesel_error_conversion;
