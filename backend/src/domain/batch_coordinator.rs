//! Batch promotion to administrator.
//!
//! Candidates are de-duplicated, filtered through the same planning rules as
//! a single promotion, then promoted by one conditional bulk write. Ineligible
//! and unknown ids are skipped; the batch never fails because of them.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::port_error_mapping::map_user_directory_error;
use super::ports::{BatchPromotionCommand, BatchPromotionReport, BulkPromotion, UserDirectory};
use super::{
    ActionOutcome, AuditAction, AuthorizationDomain, AuthorizationGuard, CallerSession,
    Capability, Error, Role, RoleTransition, UserId,
};

/// Service implementing [`BatchPromotionCommand`].
pub struct BatchCoordinator<D> {
    directory: Arc<D>,
    guard: AuthorizationGuard<D>,
    domain: AuthorizationDomain,
    clock: Arc<dyn Clock>,
}

impl<D> BatchCoordinator<D> {
    /// Build a coordinator over `directory`.
    pub fn new(directory: Arc<D>, domain: AuthorizationDomain, clock: Arc<dyn Clock>) -> Self {
        Self {
            guard: AuthorizationGuard::new(Arc::clone(&directory)),
            directory,
            domain,
            clock,
        }
    }
}

fn distinct(candidates: &[UserId]) -> Vec<UserId> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

#[async_trait]
impl<D> BatchPromotionCommand for BatchCoordinator<D>
where
    D: UserDirectory,
{
    async fn batch_promote_to_admin(
        &self,
        caller: &CallerSession,
        candidates: &[UserId],
    ) -> Result<ActionOutcome<BatchPromotionReport>, Error> {
        if candidates.is_empty() {
            return Err(Error::validation("at least one user id is required"));
        }
        let context = self
            .guard
            .authorize(caller, Capability::ManagePrivileges)
            .await?;

        let requested = distinct(candidates);
        let found = self
            .directory
            .find_many(&requested)
            .await
            .map_err(map_user_directory_error)?;
        let eligible: Vec<UserId> = found
            .iter()
            .filter(|user| {
                RoleTransition::PromoteToAdmin
                    .plan(context.id(), user, &self.domain)
                    .is_ok()
            })
            .map(|user| user.id().clone())
            .collect();

        let promoted = if eligible.is_empty() {
            debug!(actor = %context.id(), requested = requested.len(), "no eligible candidates");
            Vec::new()
        } else {
            let promotion = BulkPromotion {
                targets: eligible,
                eligible_roles: Role::UNPRIVILEGED.to_vec(),
                new_role: Role::Admin,
                actor: context.id().clone(),
                action: AuditAction::BatchPromoteToAdmin,
                details: format!("batch promotion to admin by {}", context.email()),
                changed_at: self.clock.utc(),
            };
            self.directory
                .bulk_promote(promotion)
                .await
                .map_err(map_user_directory_error)?
                .into_iter()
                .map(|user| user.id().clone())
                .collect::<Vec<_>>()
        };

        let promoted_set: HashSet<&UserId> = promoted.iter().collect();
        let skipped = requested
            .iter()
            .filter(|id| !promoted_set.contains(id))
            .cloned()
            .collect();
        let report = BatchPromotionReport {
            requested: requested.len(),
            promoted,
            skipped,
        };
        info!(
            actor = %context.id(),
            requested = report.requested,
            promoted = report.promoted_count(),
            "batch promotion finished"
        );
        let message = format!(
            "Promoted {} of {} users to administrator",
            report.promoted_count(),
            report.requested
        );
        Ok(ActionOutcome::new(message, report))
    }
}
