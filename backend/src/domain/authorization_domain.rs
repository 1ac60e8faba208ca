//! Authorization-domain aggregate.
//!
//! Holds the configuration that spans individual users: the minimum number
//! of qualifying super-administrators and the role a demoted administrator
//! falls back to. Services plan against it; stores enforce the floor inside
//! the same atomic unit as the mutation.

use super::{Error, Role};

/// Lower bound on verified super-administrators that must survive a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuperAdminFloor(u64);

impl SuperAdminFloor {
    /// The platform default: at least one.
    pub const SINGLE: Self = Self(1);

    /// Construct a floor. Zero is rejected because it would allow removing
    /// every super-administrator.
    pub fn new(minimum: u64) -> Result<Self, Error> {
        if minimum == 0 {
            return Err(Error::validation(
                "super-administrator floor must be at least one",
            ));
        }
        Ok(Self(minimum))
    }

    /// Configured minimum.
    pub const fn minimum(self) -> u64 {
        self.0
    }

    /// Whether `remaining` qualifying super-administrators satisfy the floor.
    pub const fn permits(self, remaining: u64) -> bool {
        remaining >= self.0
    }
}

impl Default for SuperAdminFloor {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Role assigned to an administrator who is demoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemotionPolicy {
    fallback: Role,
}

impl DemotionPolicy {
    /// Build a policy. The fallback must be unprivileged.
    pub fn new(fallback: Role) -> Result<Self, Error> {
        if fallback.is_elevated() {
            return Err(Error::validation(format!(
                "demotion fallback must be unprivileged, got {fallback}"
            )));
        }
        Ok(Self { fallback })
    }

    /// Role given to demoted administrators.
    pub const fn fallback(self) -> Role {
        self.fallback
    }
}

impl Default for DemotionPolicy {
    fn default() -> Self {
        Self {
            fallback: Role::Alumni,
        }
    }
}

/// Platform-wide authorization settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizationDomain {
    floor: SuperAdminFloor,
    demotion: DemotionPolicy,
}

impl AuthorizationDomain {
    /// Combine a floor and a demotion policy.
    pub const fn new(floor: SuperAdminFloor, demotion: DemotionPolicy) -> Self {
        Self { floor, demotion }
    }

    /// Minimum surviving super-administrators.
    pub const fn super_admin_floor(&self) -> SuperAdminFloor {
        self.floor
    }

    /// Policy applied on administrator demotion.
    pub const fn demotion_policy(&self) -> DemotionPolicy {
        self.demotion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn zero_floor_is_rejected() {
        let err = SuperAdminFloor::new(0).expect_err("zero floor");
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(4, true)]
    fn single_floor_needs_one_survivor(#[case] remaining: u64, #[case] expected: bool) {
        assert_eq!(SuperAdminFloor::SINGLE.permits(remaining), expected);
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::SuperAdmin)]
    fn elevated_fallback_is_rejected(#[case] role: Role) {
        assert!(DemotionPolicy::new(role).is_err());
    }

    #[rstest]
    fn defaults_demote_to_alumni_with_single_floor() {
        let domain = AuthorizationDomain::default();
        assert_eq!(domain.demotion_policy().fallback(), Role::Alumni);
        assert_eq!(domain.super_admin_floor().minimum(), 1);
    }
}
