//! Caller authorization.
//!
//! A [`CallerSession`] is what the inbound adapter knows about the caller:
//! their id plus whatever role and status the session claims. The guard
//! reloads the caller's stored record and decides against that; claimed
//! values are only compared for logging.

use std::sync::Arc;

use tracing::{debug, warn};

use super::port_error_mapping::map_user_directory_error;
use super::ports::UserDirectory;
use super::{EmailAddress, Error, Role, User, UserId, VerificationStatus};

/// Caller identity as presented by an inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerSession {
    user_id: UserId,
    claimed_role: Option<Role>,
    claimed_status: Option<VerificationStatus>,
}

impl CallerSession {
    /// Session carrying only the caller id.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            claimed_role: None,
            claimed_status: None,
        }
    }

    /// Attach the role the session claims.
    #[must_use]
    pub fn with_claimed_role(mut self, role: Role) -> Self {
        self.claimed_role = Some(role);
        self
    }

    /// Attach the verification status the session claims.
    #[must_use]
    pub fn with_claimed_status(mut self, status: VerificationStatus) -> Self {
        self.claimed_status = Some(status);
        self
    }

    /// Caller id.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role claimed by the session, if any.
    pub fn claimed_role(&self) -> Option<Role> {
        self.claimed_role
    }

    /// Status claimed by the session, if any.
    pub fn claimed_status(&self) -> Option<VerificationStatus> {
        self.claimed_status
    }
}

/// What an operation needs the caller to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Promote, demote, add or remove administrators.
    ManagePrivileges,
    /// Approve or reject registrations.
    ReviewRegistrations,
    /// Read the audit trail.
    ReadAuditTrail,
}

impl Capability {
    /// Whether a caller with `role` and `status` holds this capability.
    pub const fn permits(self, role: Role, status: VerificationStatus) -> bool {
        if !status.is_verified() {
            return false;
        }
        match self {
            Self::ManagePrivileges | Self::ReadAuditTrail => matches!(role, Role::SuperAdmin),
            Self::ReviewRegistrations => matches!(role, Role::Admin | Role::SuperAdmin),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::ManagePrivileges => "only verified super-administrators can manage privileges",
            Self::ReviewRegistrations => {
                "only verified administrators can review registrations"
            }
            Self::ReadAuditTrail => "only verified super-administrators can read the audit trail",
        }
    }
}

/// An authorised caller, backed by their stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user: User,
}

impl CallerContext {
    /// Caller id.
    pub fn id(&self) -> &UserId {
        self.user.id()
    }

    /// Caller email.
    pub fn email(&self) -> &EmailAddress {
        self.user.email()
    }

    /// Stored caller record.
    pub fn user(&self) -> &User {
        &self.user
    }
}

/// Resolves callers against the user directory.
pub struct AuthorizationGuard<D> {
    directory: Arc<D>,
}

impl<D> AuthorizationGuard<D> {
    /// Guard reading from `directory`.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

impl<D> Clone for AuthorizationGuard<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D> AuthorizationGuard<D>
where
    D: UserDirectory,
{
    /// Load the caller and check `capability` against the stored record.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the caller does not exist or lacks the capability.
    pub async fn authorize(
        &self,
        session: &CallerSession,
        capability: Capability,
    ) -> Result<CallerContext, Error> {
        let Some(user) = self
            .directory
            .find_by_id(session.user_id())
            .await
            .map_err(map_user_directory_error)?
        else {
            debug!(caller = %session.user_id(), "caller record not found");
            return Err(Error::unauthorized("caller is not a known user"));
        };

        Self::log_claim_mismatch(session, &user);

        if !capability.permits(user.role(), user.status()) {
            debug!(
                caller = %user.id(),
                role = %user.role(),
                status = %user.status(),
                ?capability,
                "caller lacks capability"
            );
            return Err(Error::unauthorized(capability.describe()));
        }
        Ok(CallerContext { user })
    }

    fn log_claim_mismatch(session: &CallerSession, user: &User) {
        let role_differs = session.claimed_role().is_some_and(|r| r != user.role());
        let status_differs = session.claimed_status().is_some_and(|s| s != user.status());
        if role_differs || status_differs {
            warn!(
                caller = %user.id(),
                claimed_role = ?session.claimed_role(),
                stored_role = %user.role(),
                claimed_status = ?session.claimed_status(),
                stored_status = %user.status(),
                "session claims differ from stored record"
            );
        }
    }
}
