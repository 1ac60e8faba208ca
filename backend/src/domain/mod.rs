//! Domain primitives, aggregates and services.
//!
//! Purpose: model users, registrations and the audit trail as strongly typed
//! values, and implement the privilege and registration workflows as
//! services over driven ports. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `User`, `Registration`, `AuditLogEntry`: records the engine mutates
//!   or appends.
//! - `RoleTransition`: the pure role state machine.
//! - Services implementing the driving ports in [`ports`].

pub mod audit;
pub mod authorization;
pub mod authorization_domain;
pub mod batch_coordinator;
pub mod error;
pub mod outcome;
pub mod ports;
pub mod registration;
pub mod registration_review_service;
pub mod role;
pub mod role_administration_service;
pub mod role_transition;
pub mod audit_trail_service;
pub mod super_admin_bootstrap;
pub mod trace_id;
pub mod user;

mod port_error_mapping;
#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::audit::{
    AuditAction, AuditFilter, AuditLogEntry, AuditTarget, NewAuditEntry, ParseAuditActionError,
};
pub use self::audit_trail_service::AuditTrailService;
pub use self::authorization::{AuthorizationGuard, CallerContext, CallerSession, Capability};
pub use self::authorization_domain::{AuthorizationDomain, DemotionPolicy, SuperAdminFloor};
pub use self::batch_coordinator::BatchCoordinator;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::outcome::ActionOutcome;
pub use self::registration::{
    ApplicantDetails, EvidenceRef, NotPendingError, Registration, RegistrationId,
    RegistrationKind, RegistrationParts, RegistrationStatus, RegistrationValidationError,
    RejectReason,
};
pub use self::registration_review_service::RegistrationReviewService;
pub use self::role::{
    ParseRoleError, ParseVerificationStatusError, PrivilegeTier, Role, VerificationStatus,
};
pub use self::role_administration_service::RoleAdministrationService;
pub use self::role_transition::{PlannedTransition, RoleTransition, TransitionRejection};
pub use self::super_admin_bootstrap::{BootstrapOutcome, SuperAdminBootstrap};
pub use self::trace_id::TraceId;
pub use self::user::{
    DisplayName, EmailAddress, User, UserId, UserIdentity, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use placement_backend::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("user 42 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
