//! Driving port for deciding pending registrations.

use async_trait::async_trait;

use crate::domain::{
    ActionOutcome, CallerSession, Error, Registration, RegistrationId, RegistrationKind,
};

/// Driving port for approving and rejecting registrations.
///
/// Callers must be verified administrators or super-administrators. `kind`
/// must match the stored registration; a mismatch is reported as
/// `NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationReviewCommand: Send + Sync {
    /// Approve a pending registration.
    ///
    /// # Errors
    ///
    /// `InvalidState` when the registration has already been decided.
    async fn approve(
        &self,
        caller: &CallerSession,
        kind: RegistrationKind,
        id: RegistrationId,
    ) -> Result<ActionOutcome<Registration>, Error>;

    /// Reject a pending registration with a non-empty reason.
    ///
    /// # Errors
    ///
    /// `ValidationError` for a blank or oversized reason, `InvalidState`
    /// when the registration has already been decided.
    async fn reject(
        &self,
        caller: &CallerSession,
        kind: RegistrationKind,
        id: RegistrationId,
        reason: &str,
    ) -> Result<ActionOutcome<Registration>, Error>;
}
