//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_log_repository;
mod audit_trail_query;
mod batch_promotion;
mod registration_repository;
mod registration_review;
mod role_administration;
mod user_directory;

#[cfg(test)]
pub use audit_log_repository::MockAuditLogRepository;
pub use audit_log_repository::{AuditLogRepository, AuditLogRepositoryError};
#[cfg(test)]
pub use audit_trail_query::MockAuditTrailQuery;
pub use audit_trail_query::AuditTrailQuery;
#[cfg(test)]
pub use batch_promotion::MockBatchPromotionCommand;
pub use batch_promotion::{BatchPromotionCommand, BatchPromotionReport};
#[cfg(test)]
pub use registration_repository::MockRegistrationRepository;
pub use registration_repository::{
    DecisionOutcome, RegistrationDecision, RegistrationRepository, RegistrationRepositoryError,
};
#[cfg(test)]
pub use registration_review::MockRegistrationReviewCommand;
pub use registration_review::RegistrationReviewCommand;
#[cfg(test)]
pub use role_administration::MockRoleAdministrationCommand;
pub use role_administration::RoleAdministrationCommand;
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{
    BulkPromotion, RoleChange, RoleChangeOutcome, UserDirectory, UserDirectoryError,
};
