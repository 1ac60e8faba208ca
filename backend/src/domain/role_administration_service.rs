//! Role administration service.
//!
//! Implements [`RoleAdministrationCommand`]. Each operation authorises the
//! caller, plans the transition against a snapshot of the target, then asks
//! the directory to apply it conditionally. The directory re-checks the
//! snapshot revision and, for super-administrator demotions, the floor, so a
//! concurrent change surfaces as a failure rather than a lost update.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use super::port_error_mapping::map_user_directory_error;
use super::ports::{RoleAdministrationCommand, RoleChange, RoleChangeOutcome, UserDirectory};
use super::{
    ActionOutcome, AuditTarget, AuthorizationDomain, AuthorizationGuard, CallerContext,
    CallerSession, Capability, EmailAddress, Error, NewAuditEntry, PlannedTransition, Role,
    RoleTransition, TransitionRejection, User, UserId,
};

/// Service applying single-user role transitions.
pub struct RoleAdministrationService<D> {
    directory: Arc<D>,
    guard: AuthorizationGuard<D>,
    domain: AuthorizationDomain,
    clock: Arc<dyn Clock>,
}

impl<D> RoleAdministrationService<D> {
    /// Build a service over `directory`.
    pub fn new(directory: Arc<D>, domain: AuthorizationDomain, clock: Arc<dyn Clock>) -> Self {
        Self {
            guard: AuthorizationGuard::new(Arc::clone(&directory)),
            directory,
            domain,
            clock,
        }
    }
}

fn rejection_to_error(rejection: TransitionRejection) -> Error {
    match rejection {
        TransitionRejection::SelfModification => Error::self_modification(rejection.to_string()),
        TransitionRejection::WrongTier { current, .. } => {
            Error::precondition_failed(rejection.to_string())
                .with_details(json!({ "currentRole": current }))
        }
        TransitionRejection::NotVerified => Error::precondition_failed(rejection.to_string()),
    }
}

fn parse_email(email: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(email).map_err(|err| Error::validation(err.to_string()))
}

fn success_message(transition: RoleTransition, user: &User) -> String {
    let name = user.display_name().as_ref();
    match transition {
        RoleTransition::PromoteToAdmin => format!("{name} is now an administrator"),
        RoleTransition::DemoteFromAdmin => {
            format!("{name} is no longer an administrator")
        }
        RoleTransition::PromoteToSuperAdmin => format!("{name} is now a super-administrator"),
        RoleTransition::DemoteFromSuperAdmin => {
            format!("{name} is no longer a super-administrator")
        }
    }
}

impl<D> RoleAdministrationService<D>
where
    D: UserDirectory,
{
    async fn load_target(&self, id: &UserId) -> Result<User, Error> {
        self.directory
            .find_by_id(id)
            .await
            .map_err(map_user_directory_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn load_target_by_email(&self, email: &EmailAddress) -> Result<User, Error> {
        self.directory
            .find_by_email(email)
            .await
            .map_err(map_user_directory_error)?
            .ok_or_else(|| Error::not_found(format!("no user registered under {email}")))
    }

    fn ensure_not_self(caller: &CallerContext, target: &UserId) -> Result<(), Error> {
        if caller.id() == target {
            debug!(caller = %caller.id(), "rejected self-modification");
            return Err(rejection_to_error(TransitionRejection::SelfModification));
        }
        Ok(())
    }

    async fn transition_by_id(
        &self,
        session: &CallerSession,
        target: &UserId,
        transition: RoleTransition,
    ) -> Result<ActionOutcome<User>, Error> {
        let caller = self
            .guard
            .authorize(session, Capability::ManagePrivileges)
            .await?;
        if transition.forbids_self() {
            Self::ensure_not_self(&caller, target)?;
        }
        let user = self.load_target(target).await?;
        self.apply(&caller, &user, transition).await
    }

    async fn apply(
        &self,
        caller: &CallerContext,
        target: &User,
        transition: RoleTransition,
    ) -> Result<ActionOutcome<User>, Error> {
        let plan = transition
            .plan(caller.id(), target, &self.domain)
            .map_err(|rejection| {
                debug!(
                    target_user = %target.id(),
                    %transition,
                    %rejection,
                    "transition rejected"
                );
                rejection_to_error(rejection)
            })?;
        let change = self.role_change(caller, target, &plan);

        match self
            .directory
            .apply_role_change(change)
            .await
            .map_err(map_user_directory_error)?
        {
            RoleChangeOutcome::Applied(updated) => {
                info!(
                    actor = %caller.id(),
                    target_user = %updated.id(),
                    from = %plan.from,
                    to = %plan.to,
                    revision = updated.revision(),
                    "role changed"
                );
                Ok(ActionOutcome::new(success_message(transition, &updated), updated))
            }
            RoleChangeOutcome::Stale { current } => {
                debug!(target_user = %target.id(), found = current.is_some(), "stale role change");
                match current {
                    Some(_) => Err(Error::precondition_failed(
                        "user was modified concurrently; reload and retry",
                    )),
                    None => Err(Error::not_found(format!("user {} not found", target.id()))),
                }
            }
            RoleChangeOutcome::FloorViolated { remaining } => {
                debug!(target_user = %target.id(), remaining, "super-administrator floor");
                Err(Error::invariant_violation(
                    "at least one other verified super-administrator must remain",
                )
                .with_details(json!({ "remaining": remaining })))
            }
            RoleChangeOutcome::ActorChanged => {
                debug!(actor = %caller.id(), "caller record changed before the write");
                Err(Error::unauthorized(
                    "caller privileges changed; sign in again and retry",
                ))
            }
        }
    }

    fn role_change(
        &self,
        caller: &CallerContext,
        target: &User,
        plan: &PlannedTransition,
    ) -> RoleChange {
        let now = self.clock.utc();
        RoleChange {
            target: target.id().clone(),
            expected_revision: plan.expected_revision,
            new_role: plan.to,
            require_verified: plan.require_verified,
            floor: plan.floor,
            changed_at: now,
            actor_revision: caller.user().revision(),
            audit: NewAuditEntry {
                actor: caller.id().clone(),
                action: plan.transition.audit_action(),
                target: AuditTarget::User(target.id().clone()),
                details: plan.describe(target),
                recorded_at: now,
            },
        }
    }
}

#[async_trait]
impl<D> RoleAdministrationCommand for RoleAdministrationService<D>
where
    D: UserDirectory,
{
    async fn promote_to_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error> {
        self.transition_by_id(caller, target, RoleTransition::PromoteToAdmin)
            .await
    }

    async fn demote_from_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error> {
        self.transition_by_id(caller, target, RoleTransition::DemoteFromAdmin)
            .await
    }

    async fn promote_to_super_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error> {
        self.transition_by_id(caller, target, RoleTransition::PromoteToSuperAdmin)
            .await
    }

    async fn demote_from_super_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error> {
        self.transition_by_id(caller, target, RoleTransition::DemoteFromSuperAdmin)
            .await
    }

    async fn add_admin_by_email(
        &self,
        caller: &CallerSession,
        email: &str,
        role: Role,
    ) -> Result<ActionOutcome<User>, Error> {
        let email = parse_email(email)?;
        let Some(transition) = RoleTransition::promotion_to(role) else {
            return Err(Error::validation(format!(
                "role must be admin or superadmin, got {role}"
            )));
        };
        let context = self
            .guard
            .authorize(caller, Capability::ManagePrivileges)
            .await?;
        let target = self.load_target_by_email(&email).await?;
        self.apply(&context, &target, transition).await
    }

    async fn remove_admin_by_email(
        &self,
        caller: &CallerSession,
        email: &str,
    ) -> Result<ActionOutcome<User>, Error> {
        let email = parse_email(email)?;
        let context = self
            .guard
            .authorize(caller, Capability::ManagePrivileges)
            .await?;
        if context.email() == &email {
            Self::ensure_not_self(&context, context.id())?;
        }
        let target = self.load_target_by_email(&email).await?;
        let Some(transition) = RoleTransition::demotion_for(target.role()) else {
            return Err(Error::precondition_failed(format!(
                "{email} is not an administrator"
            ))
            .with_details(json!({ "currentRole": target.role() })));
        };
        self.apply(&context, &target, transition).await
    }
}

#[cfg(test)]
#[path = "role_administration_service_tests.rs"]
mod tests;
