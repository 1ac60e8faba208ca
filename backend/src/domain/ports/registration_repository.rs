//! Driven port for registration records.

use async_trait::async_trait;

use crate::domain::{NewAuditEntry, Registration, RegistrationId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration repository adapters.
    pub enum RegistrationRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "registration repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "registration repository query failed: {message}",
        /// A registration with the same id already exists.
        Duplicate { message: String } => "registration already exists: {message}",
    }
}

/// A computed terminal registration plus the audit entry describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDecision {
    /// The registration in its decided form.
    pub decided: Registration,
    /// Entry appended when the decision applies.
    pub audit: NewAuditEntry,
}

/// Result of [`RegistrationRepository::record_decision`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Stored and audited.
    Applied(Registration),
    /// Another decision landed first; the stored record is returned unchanged.
    AlreadyDecided(Registration),
    /// The registration no longer exists.
    Missing,
}

/// Port for registration storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Fetch a registration by identifier.
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError>;

    /// Store a newly submitted registration.
    async fn insert(&self, registration: &Registration) -> Result<(), RegistrationRepositoryError>;

    /// Persist a decision only if the stored record is still pending, and
    /// append its audit entry in the same atomic unit.
    async fn record_decision(
        &self,
        decision: RegistrationDecision,
    ) -> Result<DecisionOutcome, RegistrationRepositoryError>;
}
