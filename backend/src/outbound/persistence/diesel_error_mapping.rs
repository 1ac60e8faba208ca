//! Shared translation of pool and Diesel failures into port errors.
//!
//! Each adapter passes its port error constructors; the mapping itself is the
//! same everywhere. Raw database messages are logged at debug level and never
//! copied into the port error.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Constructors for the port error an adapter reports.
pub(crate) struct PortErrorCtors<E> {
    pub connection: fn(String) -> E,
    pub query: fn(String) -> E,
    /// Used for unique violations; adapters without a duplicate variant
    /// fall back to `query`.
    pub duplicate: Option<fn(String) -> E>,
}

/// Map pool errors into the adapter's connection error.
pub(crate) fn map_pool_error<E>(error: PoolError, ctors: &PortErrorCtors<E>) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    (ctors.connection)(message)
}

/// Map Diesel errors into the adapter's query, connection or duplicate error.
pub(crate) fn map_diesel_error<E>(error: DieselError, ctors: &PortErrorCtors<E>) -> E {
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
        DieselError::NotFound => (ctors.query)("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => (ctors.query)("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            (ctors.connection)("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let constraint = info.constraint_name().unwrap_or("unique constraint");
            match ctors.duplicate {
                Some(duplicate) => duplicate(constraint.to_owned()),
                None => (ctors.query)(format!("unexpected violation of {constraint}")),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            (ctors.query)("transaction serialization failure".to_owned())
        }
        DieselError::DatabaseError(_, _) => (ctors.query)("database error".to_owned()),
        _ => (ctors.query)("database error".to_owned()),
    }
}
