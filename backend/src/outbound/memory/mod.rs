//! In-process store implementing every driven port.
//!
//! Users, registrations and the audit trail live behind a single mutex so a
//! mutation and its audit entry become visible together, and the
//! super-administrator floor is counted under the same lock that applies the
//! demotion. Used by the server when no database is configured and by the
//! behaviour tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AuditLogRepository, AuditLogRepositoryError, BulkPromotion, DecisionOutcome,
    RegistrationDecision, RegistrationRepository, RegistrationRepositoryError, RoleChange,
    RoleChangeOutcome, UserDirectory, UserDirectoryError,
};
use crate::domain::{
    AuditFilter, AuditLogEntry, AuditTarget, Capability, EmailAddress, NewAuditEntry,
    Registration, RegistrationId, RegistrationStatus, User, UserId,
};

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    registrations: HashMap<RegistrationId, Registration>,
    audit: Vec<AuditLogEntry>,
}

impl StoreState {
    fn qualifying_super_admins_except(&self, target: &UserId) -> u64 {
        let count = self
            .users
            .values()
            .filter(|user| user.id() != target && user.is_qualifying_super_admin())
            .count();
        u64::try_from(count).unwrap_or(u64::MAX)
    }

    fn email_taken(&self, email: &EmailAddress) -> bool {
        self.users.values().any(|user| user.email() == email)
    }
}

/// Mutex-guarded store for users, registrations and audit entries.
#[derive(Debug, Default)]
pub struct InMemoryPlacementStore {
    state: Mutex<StoreState>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryPlacementStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state.lock().map_err(|_| POISONED.to_owned())
    }

    /// Number of stored audit entries.
    ///
    /// # Errors
    ///
    /// Returns an error message when the lock is poisoned.
    pub fn audit_len(&self) -> Result<usize, String> {
        Ok(self.lock()?.audit.len())
    }
}

#[async_trait]
impl UserDirectory for InMemoryPlacementStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        let state = self.lock().map_err(UserDirectoryError::query)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError> {
        let state = self.lock().map_err(UserDirectoryError::query)?;
        Ok(state.users.values().find(|user| user.email() == email).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserDirectoryError> {
        let state = self.lock().map_err(UserDirectoryError::query)?;
        Ok(ids.iter().filter_map(|id| state.users.get(id).cloned()).collect())
    }

    async fn insert(&self, user: &User) -> Result<(), UserDirectoryError> {
        let mut state = self.lock().map_err(UserDirectoryError::query)?;
        if state.users.contains_key(user.id()) {
            return Err(UserDirectoryError::duplicate(user.id().to_string()));
        }
        if state.email_taken(user.email()) {
            return Err(UserDirectoryError::duplicate(user.email().to_string()));
        }
        state.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn count_qualifying_super_admins(&self) -> Result<u64, UserDirectoryError> {
        let state = self.lock().map_err(UserDirectoryError::query)?;
        let count = state
            .users
            .values()
            .filter(|user| user.is_qualifying_super_admin())
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn apply_role_change(
        &self,
        change: RoleChange,
    ) -> Result<RoleChangeOutcome, UserDirectoryError> {
        let mut state = self.lock().map_err(UserDirectoryError::query)?;

        let actor_unchanged = state.users.get(&change.audit.actor).is_some_and(|actor| {
            actor.revision() == change.actor_revision
                && Capability::ManagePrivileges.permits(actor.role(), actor.status())
        });
        if !actor_unchanged {
            return Ok(RoleChangeOutcome::ActorChanged);
        }

        if let Some(floor) = change.floor {
            let remaining = state.qualifying_super_admins_except(&change.target);
            if !floor.permits(remaining) {
                return Ok(RoleChangeOutcome::FloorViolated { remaining });
            }
        }

        let Some(current) = state.users.get(&change.target) else {
            return Ok(RoleChangeOutcome::Stale { current: None });
        };
        let verified_ok = !change.require_verified || current.status().is_verified();
        if current.revision() != change.expected_revision || !verified_ok {
            return Ok(RoleChangeOutcome::Stale {
                current: Some(current.clone()),
            });
        }

        let updated = current.with_role(change.new_role, change.changed_at);
        state.users.insert(updated.id().clone(), updated.clone());
        state.audit.push(change.audit.into_entry());
        Ok(RoleChangeOutcome::Applied(updated))
    }

    async fn bulk_promote(&self, promotion: BulkPromotion) -> Result<Vec<User>, UserDirectoryError> {
        let mut state = self.lock().map_err(UserDirectoryError::query)?;
        let mut promoted = Vec::new();
        for id in &promotion.targets {
            let Some(current) = state.users.get(id) else {
                continue;
            };
            if !current.status().is_verified()
                || !promotion.eligible_roles.contains(&current.role())
            {
                continue;
            }
            let updated = current.with_role(promotion.new_role, promotion.changed_at);
            state.users.insert(id.clone(), updated.clone());
            promoted.push(updated);
        }
        for user in &promoted {
            let entry = NewAuditEntry {
                actor: promotion.actor.clone(),
                action: promotion.action,
                target: AuditTarget::User(user.id().clone()),
                details: promotion.details.clone(),
                recorded_at: promotion.changed_at,
            };
            state.audit.push(entry.into_entry());
        }
        Ok(promoted)
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryPlacementStore {
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        let state = self.lock().map_err(RegistrationRepositoryError::query)?;
        Ok(state.registrations.get(id).cloned())
    }

    async fn insert(&self, registration: &Registration) -> Result<(), RegistrationRepositoryError> {
        let mut state = self.lock().map_err(RegistrationRepositoryError::query)?;
        if state.registrations.contains_key(&registration.id()) {
            return Err(RegistrationRepositoryError::duplicate(
                registration.id().to_string(),
            ));
        }
        state
            .registrations
            .insert(registration.id(), registration.clone());
        Ok(())
    }

    async fn record_decision(
        &self,
        decision: RegistrationDecision,
    ) -> Result<DecisionOutcome, RegistrationRepositoryError> {
        let mut state = self.lock().map_err(RegistrationRepositoryError::query)?;
        let id = decision.decided.id();
        match state.registrations.get(&id) {
            None => return Ok(DecisionOutcome::Missing),
            Some(current) if current.status() != RegistrationStatus::Pending => {
                return Ok(DecisionOutcome::AlreadyDecided(current.clone()));
            }
            Some(_) => {}
        }
        state.registrations.insert(id, decision.decided.clone());
        state.audit.push(decision.audit.into_entry());
        Ok(DecisionOutcome::Applied(decision.decided))
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryPlacementStore {
    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError> {
        let state = self.lock().map_err(AuditLogRepositoryError::query)?;
        // Appended in commit order, so reversing yields newest first even
        // when timestamps tie.
        Ok(state
            .audit
            .iter()
            .rev()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests;
