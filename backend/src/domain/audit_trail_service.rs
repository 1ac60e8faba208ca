//! Audit trail query service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::port_error_mapping::map_audit_log_error;
use super::ports::{AuditLogRepository, AuditTrailQuery, UserDirectory};
use super::{
    ActionOutcome, AuditFilter, AuditLogEntry, AuthorizationGuard, CallerSession, Capability,
    Error,
};

/// Service implementing [`AuditTrailQuery`].
pub struct AuditTrailService<A, D> {
    audit_log: Arc<A>,
    guard: AuthorizationGuard<D>,
}

impl<A, D> AuditTrailService<A, D> {
    /// Build a service over `audit_log`, authorising against `directory`.
    pub fn new(audit_log: Arc<A>, directory: Arc<D>) -> Self {
        Self {
            audit_log,
            guard: AuthorizationGuard::new(directory),
        }
    }
}

#[async_trait]
impl<A, D> AuditTrailQuery for AuditTrailService<A, D>
where
    A: AuditLogRepository,
    D: UserDirectory,
{
    async fn list_entries(
        &self,
        caller: &CallerSession,
        filter: AuditFilter,
    ) -> Result<ActionOutcome<Vec<AuditLogEntry>>, Error> {
        let context = self
            .guard
            .authorize(caller, Capability::ReadAuditTrail)
            .await?;
        let entries = self
            .audit_log
            .list(&filter)
            .await
            .map_err(map_audit_log_error)?;
        debug!(actor = %context.id(), count = entries.len(), "audit trail listed");
        let message = format!("{} audit entries", entries.len());
        Ok(ActionOutcome::new(message, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAuditLogRepository, MockUserDirectory};
    use crate::domain::test_fixtures::{fixture_timestamp, session_for, user};
    use crate::domain::{
        AuditAction, AuditTarget, ErrorCode, NewAuditEntry, Role, UserId, VerificationStatus,
    };

    fn directory_for(caller: &crate::domain::User) -> MockUserDirectory {
        let stored = caller.clone();
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        directory
    }

    #[tokio::test]
    async fn super_admin_lists_filtered_entries() {
        let caller = user(Role::SuperAdmin, VerificationStatus::Verified);
        let target = AuditTarget::User(UserId::random());
        let entry = NewAuditEntry {
            actor: caller.id().clone(),
            action: AuditAction::PromoteToAdmin,
            target: target.clone(),
            details: "promoted".to_owned(),
            recorded_at: fixture_timestamp(),
        }
        .into_entry();
        let mut audit_log = MockAuditLogRepository::new();
        let expected_target = target.clone();
        audit_log
            .expect_list()
            .times(1)
            .withf(move |filter| filter.target.as_ref() == Some(&expected_target))
            .return_once(move |_| Ok(vec![entry]));
        let service = AuditTrailService::new(Arc::new(audit_log), Arc::new(directory_for(&caller)));

        let outcome = service
            .list_entries(
                &session_for(&caller),
                AuditFilter {
                    target: Some(target),
                    actor: None,
                },
            )
            .await
            .expect("listing succeeds");

        assert_eq!(outcome.data().len(), 1);
    }

    #[tokio::test]
    async fn admins_cannot_read_the_trail() {
        let caller = user(Role::Admin, VerificationStatus::Verified);
        let mut audit_log = MockAuditLogRepository::new();
        audit_log.expect_list().times(0);
        let service = AuditTrailService::new(Arc::new(audit_log), Arc::new(directory_for(&caller)));

        let err = service
            .list_entries(&session_for(&caller), AuditFilter::default())
            .await
            .expect_err("unauthorized");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
