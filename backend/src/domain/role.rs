//! Privilege roles and verification status.
//!
//! Roles form a total order of privilege. Guests, alumni and companies share
//! the unprivileged tier; administrators are elevated; super-administrators
//! are maximal. Both enums are closed so every transition matches on them
//! exhaustively and no free-form string ever reaches the store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Privilege tier a [`Role`] belongs to, ordered from least to most
/// privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrivilegeTier {
    /// Guests, alumni and companies.
    Unprivileged,
    /// Administrators.
    Admin,
    /// Super-administrators.
    SuperAdmin,
}

impl std::fmt::Display for PrivilegeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unprivileged => "unprivileged",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        })
    }
}

/// User role.
///
/// # Examples
/// ```
/// use placement_backend::domain::{PrivilegeTier, Role};
///
/// assert_eq!(Role::Alumni.tier(), PrivilegeTier::Unprivileged);
/// assert!(Role::SuperAdmin.is_elevated());
/// assert_eq!("company".parse::<Role>(), Ok(Role::Company));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Signed up, not yet recognised.
    Guest,
    /// Recognised alumnus.
    Alumni,
    /// Recognised corporate account.
    Company,
    /// Administrator; may review registrations.
    Admin,
    /// Super-administrator; may reassign privileges.
    SuperAdmin,
}

impl Role {
    /// Every role, least privileged first.
    pub const ALL: [Role; 5] = [
        Role::Guest,
        Role::Alumni,
        Role::Company,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// Roles in the unprivileged tier.
    pub const UNPRIVILEGED: [Role; 3] = [Role::Guest, Role::Alumni, Role::Company];

    /// Returns the storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Alumni => "alumni",
            Self::Company => "company",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }

    /// Tier of this role in the privilege order.
    pub const fn tier(self) -> PrivilegeTier {
        match self {
            Self::Guest | Self::Alumni | Self::Company => PrivilegeTier::Unprivileged,
            Self::Admin => PrivilegeTier::Admin,
            Self::SuperAdmin => PrivilegeTier::SuperAdmin,
        }
    }

    /// Whether the role is administrator or above.
    pub const fn is_elevated(self) -> bool {
        !matches!(self.tier(), PrivilegeTier::Unprivileged)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {input}")]
pub struct ParseRoleError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseRoleError {
                input: s.to_owned(),
            })
    }
}

/// Verification status of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// No verification has been requested.
    Unverified,
    /// Verification requested and awaiting review.
    Pending,
    /// Verified; eligible for elevated roles.
    Verified,
}

impl VerificationStatus {
    /// Returns the storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Verified => "verified",
        }
    }

    /// Whether the account is verified.
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown verification status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown verification status: {input}")]
pub struct ParseVerificationStatusError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::str::FromStr for VerificationStatus {
    type Err = ParseVerificationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(Self::Unverified),
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            other => Err(ParseVerificationStatusError {
                input: other.to_owned(),
            }),
        }
    }
}
