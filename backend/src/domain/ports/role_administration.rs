//! Driving port for single-user privilege changes.
//!
//! Inbound adapters resolve the caller's session into a [`CallerSession`]
//! and call these operations. Every operation authorises the caller against
//! the stored record before touching the target.

use async_trait::async_trait;

use crate::domain::{ActionOutcome, CallerSession, Error, Role, User, UserId};

/// Driving port for promoting and demoting individual users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleAdministrationCommand: Send + Sync {
    /// Elevate a verified, unprivileged user to administrator.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for non-super-administrator callers, `NotFound` for an
    /// unknown target, `PreconditionFailed` when the target is not eligible.
    async fn promote_to_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error>;

    /// Return an administrator to the unprivileged tier.
    ///
    /// # Errors
    ///
    /// Adds `SelfModification` when the caller targets themself.
    async fn demote_from_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error>;

    /// Elevate a verified administrator to super-administrator.
    async fn promote_to_super_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error>;

    /// Return a super-administrator to administrator.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` when no other qualifying super-administrator
    /// would remain.
    async fn demote_from_super_admin(
        &self,
        caller: &CallerSession,
        target: &UserId,
    ) -> Result<ActionOutcome<User>, Error>;

    /// Grant `role` (administrator or super-administrator) to the user
    /// registered under `email`.
    ///
    /// # Errors
    ///
    /// `ValidationError` for a malformed email or an unprivileged role.
    async fn add_admin_by_email(
        &self,
        caller: &CallerSession,
        email: &str,
        role: Role,
    ) -> Result<ActionOutcome<User>, Error>;

    /// Strip privileges from the user registered under `email`.
    async fn remove_admin_by_email(
        &self,
        caller: &CallerSession,
        email: &str,
    ) -> Result<ActionOutcome<User>, Error>;
}
