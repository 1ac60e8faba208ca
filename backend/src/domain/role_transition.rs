//! Role state machine.
//!
//! Edges are single-step only: `{guest, alumni, company} <-> admin <->
//! superadmin`. Planning is pure; it decides whether a transition may be
//! attempted against a snapshot of the target and what the store must
//! re-check when applying it.

use std::fmt;

use super::{AuditAction, AuthorizationDomain, PrivilegeTier, Role, SuperAdminFloor, User, UserId};

/// A single-step privilege change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleTransition {
    /// Unprivileged to administrator.
    PromoteToAdmin,
    /// Administrator to unprivileged.
    DemoteFromAdmin,
    /// Administrator to super-administrator.
    PromoteToSuperAdmin,
    /// Super-administrator to administrator.
    DemoteFromSuperAdmin,
}

/// Why a transition cannot be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionRejection {
    /// The caller targeted their own account with a demotion.
    #[error("administrators cannot change their own privileges")]
    SelfModification,
    /// The target is not in the tier the transition starts from.
    #[error("user has role {current}, expected the {expected} tier")]
    WrongTier {
        /// Target's current role.
        current: Role,
        /// Tier the transition starts from.
        expected: PrivilegeTier,
    },
    /// The transition needs a verified target.
    #[error("user must be verified before promotion")]
    NotVerified,
}

/// A transition checked against a target snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedTransition {
    /// Transition being applied.
    pub transition: RoleTransition,
    /// Role the target holds in the snapshot.
    pub from: Role,
    /// Role to apply.
    pub to: Role,
    /// Revision of the snapshot.
    pub expected_revision: u32,
    /// Whether the store must still see a verified target.
    pub require_verified: bool,
    /// Floor the store must evaluate, for demotions of super-administrators.
    pub floor: Option<SuperAdminFloor>,
}

impl RoleTransition {
    /// Audit tag recorded when the transition applies.
    pub const fn audit_action(self) -> AuditAction {
        match self {
            Self::PromoteToAdmin => AuditAction::PromoteToAdmin,
            Self::DemoteFromAdmin => AuditAction::DemoteFromAdmin,
            Self::PromoteToSuperAdmin => AuditAction::PromoteToSuperAdmin,
            Self::DemoteFromSuperAdmin => AuditAction::DemoteFromSuperAdmin,
        }
    }

    /// Tier the target must currently occupy.
    pub const fn source_tier(self) -> PrivilegeTier {
        match self {
            Self::PromoteToAdmin => PrivilegeTier::Unprivileged,
            Self::DemoteFromAdmin | Self::PromoteToSuperAdmin => PrivilegeTier::Admin,
            Self::DemoteFromSuperAdmin => PrivilegeTier::SuperAdmin,
        }
    }

    /// Promotions need a verified target.
    pub const fn requires_verified(self) -> bool {
        match self {
            Self::PromoteToAdmin | Self::PromoteToSuperAdmin => true,
            Self::DemoteFromAdmin | Self::DemoteFromSuperAdmin => false,
        }
    }

    /// Demotions may not target the caller.
    pub const fn forbids_self(self) -> bool {
        match self {
            Self::DemoteFromAdmin | Self::DemoteFromSuperAdmin => true,
            Self::PromoteToAdmin | Self::PromoteToSuperAdmin => false,
        }
    }

    /// Role applied by the transition.
    pub const fn target_role(self, domain: &AuthorizationDomain) -> Role {
        match self {
            Self::PromoteToAdmin | Self::DemoteFromSuperAdmin => Role::Admin,
            Self::DemoteFromAdmin => domain.demotion_policy().fallback(),
            Self::PromoteToSuperAdmin => Role::SuperAdmin,
        }
    }

    /// Demotion that removes whatever privilege `role` carries, if any.
    pub const fn demotion_for(role: Role) -> Option<Self> {
        match role.tier() {
            PrivilegeTier::Unprivileged => None,
            PrivilegeTier::Admin => Some(Self::DemoteFromAdmin),
            PrivilegeTier::SuperAdmin => Some(Self::DemoteFromSuperAdmin),
        }
    }

    /// Promotion that grants `role`, if it is a privileged role.
    pub const fn promotion_to(role: Role) -> Option<Self> {
        match role.tier() {
            PrivilegeTier::Unprivileged => None,
            PrivilegeTier::Admin => Some(Self::PromoteToAdmin),
            PrivilegeTier::SuperAdmin => Some(Self::PromoteToSuperAdmin),
        }
    }

    /// Check the transition against `target` as seen by `caller`.
    pub fn plan(
        self,
        caller: &UserId,
        target: &User,
        domain: &AuthorizationDomain,
    ) -> Result<PlannedTransition, TransitionRejection> {
        if self.forbids_self() && caller == target.id() {
            return Err(TransitionRejection::SelfModification);
        }
        let expected = self.source_tier();
        if target.role().tier() != expected {
            return Err(TransitionRejection::WrongTier {
                current: target.role(),
                expected,
            });
        }
        if self.requires_verified() && !target.status().is_verified() {
            return Err(TransitionRejection::NotVerified);
        }
        let floor = match self {
            Self::DemoteFromSuperAdmin => Some(domain.super_admin_floor()),
            Self::PromoteToAdmin | Self::DemoteFromAdmin | Self::PromoteToSuperAdmin => None,
        };
        Ok(PlannedTransition {
            transition: self,
            from: target.role(),
            to: self.target_role(domain),
            expected_revision: target.revision(),
            require_verified: self.requires_verified(),
            floor,
        })
    }
}

impl fmt::Display for RoleTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.audit_action().as_str())
    }
}

impl PlannedTransition {
    /// Audit description for the change.
    pub fn describe(&self, target: &User) -> String {
        format!(
            "{} ({}) changed from {} to {}",
            target.display_name().as_ref(),
            target.email(),
            self.from,
            self.to
        )
    }
}
