//! Translation of driven-port errors into domain errors.
//!
//! Connection failures surface as `service_unavailable`; everything else the
//! caller cannot act on becomes `internal_error` and is redacted at the
//! HTTP boundary.

use super::Error;
use super::ports::{AuditLogRepositoryError, RegistrationRepositoryError, UserDirectoryError};

pub(crate) fn map_user_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
        UserDirectoryError::Duplicate { message } => {
            Error::internal(format!("unexpected duplicate user: {message}"))
        }
    }
}

pub(crate) fn map_registration_error(error: RegistrationRepositoryError) -> Error {
    match error {
        RegistrationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("registration repository unavailable: {message}"))
        }
        RegistrationRepositoryError::Query { message } => {
            Error::internal(format!("registration repository error: {message}"))
        }
        RegistrationRepositoryError::Duplicate { message } => {
            Error::internal(format!("unexpected duplicate registration: {message}"))
        }
    }
}

pub(crate) fn map_audit_log_error(error: AuditLogRepositoryError) -> Error {
    match error {
        AuditLogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("audit log unavailable: {message}"))
        }
        AuditLogRepositoryError::Query { message } => {
            Error::internal(format!("audit log error: {message}"))
        }
    }
}
