//! Driven port for reading the audit trail.
//!
//! Writes never go through this port; entries are appended by the user and
//! registration stores alongside the mutation they describe.

use async_trait::async_trait;

use crate::domain::{AuditFilter, AuditLogEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by audit log adapters.
    pub enum AuditLogRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } => "audit log connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "audit log query failed: {message}",
    }
}

/// Port for audit trail reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Entries matching `filter`, newest first.
    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError>;
}
