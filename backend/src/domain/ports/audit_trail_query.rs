//! Driving port for reading the audit trail.

use async_trait::async_trait;

use crate::domain::{ActionOutcome, AuditFilter, AuditLogEntry, CallerSession, Error};

/// Driving port for audit trail reads. Restricted to super-administrators.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditTrailQuery: Send + Sync {
    /// Entries matching `filter`, newest first.
    async fn list_entries(
        &self,
        caller: &CallerSession,
        filter: AuditFilter,
    ) -> Result<ActionOutcome<Vec<AuditLogEntry>>, Error>;
}
