//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every admin endpoint and the session cookie security
//! scheme. The document backs Swagger UI in debug builds and is exported by
//! the `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::BatchPromotionReport;
use crate::domain::{
    AuditAction, AuditLogEntry, AuditTarget, Error, ErrorCode, Registration, RegistrationKind,
    RegistrationStatus, Role, User, VerificationStatus,
};
use crate::inbound::http::admin_roles::{AddAdminRequest, BatchPromoteRequest, RemoveAdminRequest};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::registrations::RejectRequest;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie carrying the signed-in user's id.",
            ))),
        );
    }
}

/// OpenAPI document for the admin REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Placement authorization API",
        description = "Privilege administration, registration review and audit trail for the alumni placement platform."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::admin_roles::promote_to_admin,
        crate::inbound::http::admin_roles::demote_from_admin,
        crate::inbound::http::admin_roles::promote_to_super_admin,
        crate::inbound::http::admin_roles::demote_from_super_admin,
        crate::inbound::http::admin_roles::add_admin_by_email,
        crate::inbound::http::admin_roles::remove_admin_by_email,
        crate::inbound::http::admin_roles::batch_promote_to_admin,
        crate::inbound::http::registrations::approve_registration,
        crate::inbound::http::registrations::reject_registration,
        crate::inbound::http::audit::list_audit_entries,
    ),
    components(schemas(
        User,
        Role,
        VerificationStatus,
        Registration,
        RegistrationKind,
        RegistrationStatus,
        AuditLogEntry,
        AuditAction,
        AuditTarget,
        BatchPromotionReport,
        Error,
        ErrorCode,
        ErrorEnvelope,
        AddAdminRequest,
        RemoveAdminRequest,
        BatchPromoteRequest,
        RejectRequest
    )),
    tags(
        (name = "admin", description = "Promote, demote, add and remove administrators"),
        (name = "registrations", description = "Approve or reject pending registrations"),
        (name = "audit", description = "Read the privileged-action audit trail")
    )
)]
pub struct ApiDoc;
