//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuditTrailQuery, BatchPromotionCommand, RegistrationReviewCommand, RoleAdministrationCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub roles: Arc<dyn RoleAdministrationCommand>,
    pub batch: Arc<dyn BatchPromotionCommand>,
    pub registrations: Arc<dyn RegistrationReviewCommand>,
    pub audit: Arc<dyn AuditTrailQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        roles: Arc<dyn RoleAdministrationCommand>,
        batch: Arc<dyn BatchPromotionCommand>,
        registrations: Arc<dyn RegistrationReviewCommand>,
        audit: Arc<dyn AuditTrailQuery>,
    ) -> Self {
        Self {
            roles,
            batch,
            registrations,
            audit,
        }
    }
}
