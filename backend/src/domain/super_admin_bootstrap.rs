//! Startup provisioning of the first super-administrator.
//!
//! An empty directory has no one who could promote anyone. When configured
//! with an email, startup inserts a verified super-administrator under it if
//! no qualifying super-administrator exists yet.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use super::port_error_mapping::map_user_directory_error;
use super::ports::{UserDirectory, UserDirectoryError};
use super::{
    DisplayName, EmailAddress, Error, Role, User, UserId, UserIdentity, Username,
    VerificationStatus,
};

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;

/// Result of [`SuperAdminBootstrap::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A qualifying super-administrator already existed.
    AlreadySatisfied,
    /// A new super-administrator was inserted.
    Created(User),
    /// The email belongs to an existing account, which is left untouched.
    EmailTaken(User),
}

/// Ensures the directory has at least one qualifying super-administrator.
pub struct SuperAdminBootstrap<D> {
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
}

fn username_from(email: &EmailAddress) -> Result<Username, Error> {
    let local = email.as_ref().split('@').next().unwrap_or_default();
    let mut handle: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .take(USERNAME_MAX)
        .collect();
    while handle.len() < USERNAME_MIN {
        handle.push('_');
    }
    Username::new(handle).map_err(|err| Error::validation(err.to_string()))
}

impl<D> SuperAdminBootstrap<D>
where
    D: UserDirectory,
{
    /// Bootstrap against `directory`.
    pub fn new(directory: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self { directory, clock }
    }

    /// Insert a verified super-administrator under `email` if none exists.
    ///
    /// # Errors
    ///
    /// `ValidationError` for a malformed email. `PreconditionFailed` when the
    /// derived username is held by another account and no super-administrator
    /// exists. Store failures as mapped domain errors.
    pub async fn ensure(&self, email: &str) -> Result<BootstrapOutcome, Error> {
        let email = EmailAddress::new(email).map_err(|err| Error::validation(err.to_string()))?;
        let existing = self
            .directory
            .count_qualifying_super_admins()
            .await
            .map_err(map_user_directory_error)?;
        if existing > 0 {
            return Ok(BootstrapOutcome::AlreadySatisfied);
        }
        if let Some(user) = self
            .directory
            .find_by_email(&email)
            .await
            .map_err(map_user_directory_error)?
        {
            warn!(user = %user.id(), role = %user.role(), "bootstrap email already registered");
            return Ok(BootstrapOutcome::EmailTaken(user));
        }

        let identity = UserIdentity {
            id: UserId::random(),
            username: username_from(&email)?,
            display_name: DisplayName::new("Platform Administrator")
                .map_err(|err| Error::validation(err.to_string()))?,
            email,
        };
        let user = User::new(
            identity,
            Role::SuperAdmin,
            VerificationStatus::Verified,
            self.clock.utc(),
        );
        match self.directory.insert(&user).await {
            Ok(()) => {
                info!(user = %user.id(), "bootstrapped super-administrator");
                Ok(BootstrapOutcome::Created(user))
            }
            Err(UserDirectoryError::Duplicate { message }) => {
                self.after_duplicate(&user, &message).await
            }
            Err(err) => Err(map_user_directory_error(err)),
        }
    }

    /// A concurrent bootstrap may have won the insert; anything else is a
    /// collision the operator must resolve.
    async fn after_duplicate(
        &self,
        user: &User,
        message: &str,
    ) -> Result<BootstrapOutcome, Error> {
        let existing = self
            .directory
            .count_qualifying_super_admins()
            .await
            .map_err(map_user_directory_error)?;
        if existing > 0 {
            return Ok(BootstrapOutcome::AlreadySatisfied);
        }
        warn!(username = user.username().as_ref(), %message, "bootstrap insert collided");
        Err(Error::precondition_failed(format!(
            "cannot bootstrap super-administrator: username {} is already taken",
            user.username().as_ref()
        )))
    }
}
