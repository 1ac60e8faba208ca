//! Driven port for user records.
//!
//! Role mutations go through [`UserDirectory::apply_role_change`] and
//! [`UserDirectory::bulk_promote`]. Both are conditional writes evaluated by
//! the store, and both append their audit entries in the same atomic unit.
//! Adapters must serialise floor-guarded changes so two concurrent demotions
//! cannot each observe "one other super-administrator remains".

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AuditAction, EmailAddress, NewAuditEntry, Role, SuperAdminFloor, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// Store connection could not be established.
        Connection { message: String } => "user directory connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user directory query failed: {message}",
        /// A user with the same id or email already exists.
        Duplicate { message: String } => "user already exists: {message}",
    }
}

/// Conditional role change for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange {
    /// User being changed.
    pub target: UserId,
    /// Revision the caller planned against.
    pub expected_revision: u32,
    /// Role to apply.
    pub new_role: Role,
    /// Require the stored status to still be verified.
    pub require_verified: bool,
    /// Minimum qualifying super-administrators that must remain, excluding
    /// the target, for the change to apply.
    pub floor: Option<SuperAdminFloor>,
    /// Timestamp stamped on the record.
    pub changed_at: DateTime<Utc>,
    /// Revision of the caller's record when their privileges were checked.
    /// The caller is `audit.actor`; the change applies only while that
    /// record is unchanged and still grants privilege management.
    pub actor_revision: u32,
    /// Entry appended when the change applies.
    pub audit: NewAuditEntry,
}

/// Result of [`UserDirectory::apply_role_change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChangeOutcome {
    /// The change and its audit entry were committed.
    Applied(User),
    /// The record changed since it was read, or no longer exists.
    Stale {
        /// Current record, if it still exists.
        current: Option<User>,
    },
    /// Applying the change would breach the super-administrator floor.
    FloorViolated {
        /// Qualifying super-administrators other than the target.
        remaining: u64,
    },
    /// The caller's record changed or lost privilege management after the
    /// authorisation check.
    ActorChanged,
}

/// Bulk promotion of a pre-filtered candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPromotion {
    /// Users to promote.
    pub targets: Vec<UserId>,
    /// Only users currently in one of these roles are promoted.
    pub eligible_roles: Vec<Role>,
    /// Role to apply.
    pub new_role: Role,
    /// Caller performing the batch.
    pub actor: UserId,
    /// Audit tag written per promoted user.
    pub action: AuditAction,
    /// Audit description written per promoted user.
    pub details: String,
    /// Timestamp stamped on records and audit entries.
    pub changed_at: DateTime<Utc>,
}

/// Port for user record access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &EmailAddress)
    -> Result<Option<User>, UserDirectoryError>;

    /// Fetch every user whose id is in `ids`. Unknown ids are skipped.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserDirectoryError>;

    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserDirectoryError>;

    /// Count verified super-administrators.
    async fn count_qualifying_super_admins(&self) -> Result<u64, UserDirectoryError>;

    /// Apply a conditional role change and its audit entry atomically.
    async fn apply_role_change(
        &self,
        change: RoleChange,
    ) -> Result<RoleChangeOutcome, UserDirectoryError>;

    /// Promote every still-eligible, verified target in one atomic unit and
    /// append one audit entry per promoted user. Returns promoted records.
    async fn bulk_promote(&self, promotion: BulkPromotion) -> Result<Vec<User>, UserDirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn error_constructors_format_messages() {
        assert_eq!(
            UserDirectoryError::connection("refused").to_string(),
            "user directory connection failed: refused"
        );
        assert_eq!(
            UserDirectoryError::duplicate("ada@example.org").to_string(),
            "user already exists: ada@example.org"
        );
    }
}
