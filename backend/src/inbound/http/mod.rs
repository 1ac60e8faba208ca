//! HTTP inbound adapter exposing the admin REST endpoints.

use actix_web::web;

pub mod admin_roles;
pub mod audit;
pub mod envelope;
pub mod error;
pub mod registrations;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub(crate) mod validation;

pub use error::ApiResult;

/// Register every admin endpoint on a scope mounted at `/api/v1`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use placement_backend::inbound::http::configure_admin_routes;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_admin_routes));
/// ```
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(admin_roles::promote_to_admin)
        .service(admin_roles::demote_from_admin)
        .service(admin_roles::promote_to_super_admin)
        .service(admin_roles::demote_from_super_admin)
        .service(admin_roles::add_admin_by_email)
        .service(admin_roles::remove_admin_by_email)
        .service(admin_roles::batch_promote_to_admin)
        .service(registrations::approve_registration)
        .service(registrations::reject_registration)
        .service(audit::list_audit_entries);
}
