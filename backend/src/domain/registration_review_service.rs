//! Registration review service.
//!
//! `pending -> approved` and `pending -> rejected` are the only edges. The
//! decided record is computed here; the repository stores it only if the
//! stored record is still pending, so two reviewers racing on the same
//! registration cannot both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use super::port_error_mapping::map_registration_error;
use super::ports::{
    DecisionOutcome, RegistrationDecision, RegistrationRepository, RegistrationReviewCommand,
    UserDirectory,
};
use super::{
    ActionOutcome, AuditAction, AuditTarget, AuthorizationGuard, CallerContext, CallerSession,
    Capability, Error, NewAuditEntry, NotPendingError, Registration, RegistrationId,
    RegistrationKind, RejectReason,
};

/// Service implementing [`RegistrationReviewCommand`].
pub struct RegistrationReviewService<R, D> {
    registrations: Arc<R>,
    guard: AuthorizationGuard<D>,
    clock: Arc<dyn Clock>,
}

impl<R, D> RegistrationReviewService<R, D> {
    /// Build a service over `registrations`, authorising against `directory`.
    pub fn new(registrations: Arc<R>, directory: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registrations,
            guard: AuthorizationGuard::new(directory),
            clock,
        }
    }
}

fn not_found(kind: RegistrationKind, id: RegistrationId) -> Error {
    Error::not_found(format!("{kind} registration {id} not found"))
}

fn not_pending(error: NotPendingError) -> Error {
    Error::invalid_state(error.to_string()).with_details(json!({ "status": error.status }))
}

impl<R, D> RegistrationReviewService<R, D>
where
    R: RegistrationRepository,
    D: UserDirectory,
{
    async fn load_pending_candidate(
        &self,
        kind: RegistrationKind,
        id: RegistrationId,
    ) -> Result<Registration, Error> {
        match self
            .registrations
            .find_by_id(&id)
            .await
            .map_err(map_registration_error)?
        {
            Some(registration) if registration.kind() == kind => Ok(registration),
            Some(registration) => {
                debug!(
                    registration = %id,
                    requested = %kind,
                    stored = %registration.kind(),
                    "registration kind mismatch"
                );
                Err(not_found(kind, id))
            }
            None => Err(not_found(kind, id)),
        }
    }

    async fn decide(
        &self,
        caller: &CallerContext,
        decided: Result<Registration, NotPendingError>,
        action: AuditAction,
        details: String,
    ) -> Result<ActionOutcome<Registration>, Error> {
        let decided = decided.map_err(|err| {
            debug!(%err, "registration already decided");
            not_pending(err)
        })?;
        let kind = decided.kind();
        let id = decided.id();
        let decision = RegistrationDecision {
            audit: NewAuditEntry {
                actor: caller.id().clone(),
                action,
                target: AuditTarget::Registration(id),
                details,
                recorded_at: self.clock.utc(),
            },
            decided,
        };

        match self
            .registrations
            .record_decision(decision)
            .await
            .map_err(map_registration_error)?
        {
            DecisionOutcome::Applied(registration) => {
                info!(
                    actor = %caller.id(),
                    registration = %id,
                    %kind,
                    status = %registration.status(),
                    "registration decided"
                );
                let message = format!(
                    "{kind} registration for {} is now {}",
                    registration.applicant_email(),
                    registration.status()
                );
                Ok(ActionOutcome::new(message, registration))
            }
            DecisionOutcome::AlreadyDecided(current) => Err(not_pending(NotPendingError {
                status: current.status(),
            })),
            DecisionOutcome::Missing => Err(not_found(kind, id)),
        }
    }
}

#[async_trait]
impl<R, D> RegistrationReviewCommand for RegistrationReviewService<R, D>
where
    R: RegistrationRepository,
    D: UserDirectory,
{
    async fn approve(
        &self,
        caller: &CallerSession,
        kind: RegistrationKind,
        id: RegistrationId,
    ) -> Result<ActionOutcome<Registration>, Error> {
        let context = self
            .guard
            .authorize(caller, Capability::ReviewRegistrations)
            .await?;
        let registration = self.load_pending_candidate(kind, id).await?;
        let now = self.clock.utc();
        let details = format!(
            "approved {kind} registration for {}",
            registration.applicant_email()
        );
        self.decide(
            &context,
            registration.approve(context.id(), now),
            AuditAction::ApproveRegistration,
            details,
        )
        .await
    }

    async fn reject(
        &self,
        caller: &CallerSession,
        kind: RegistrationKind,
        id: RegistrationId,
        reason: &str,
    ) -> Result<ActionOutcome<Registration>, Error> {
        let reason = RejectReason::new(reason).map_err(|err| Error::validation(err.to_string()))?;
        let context = self
            .guard
            .authorize(caller, Capability::ReviewRegistrations)
            .await?;
        let registration = self.load_pending_candidate(kind, id).await?;
        let now = self.clock.utc();
        let details = format!(
            "rejected {kind} registration for {}: {}",
            registration.applicant_email(),
            reason.as_ref()
        );
        self.decide(
            &context,
            registration.reject(context.id(), reason, now),
            AuditAction::RejectRegistration,
            details,
        )
        .await
    }
}

#[cfg(test)]
#[path = "registration_review_service_tests.rs"]
mod tests;
