//! Audit trail HTTP handler.
//!
//! ```text
//! GET /api/v1/admin/audit?targetUserId=...&actorId=...
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{AuditFilter, AuditLogEntry, AuditTarget, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::ActionEnvelope;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, conflicting_fields_error, parse_registration_id, parse_user_id,
};

const TARGET_USER: FieldName = FieldName::new("targetUserId");
const TARGET_REGISTRATION: FieldName = FieldName::new("targetRegistrationId");

/// Optional audit filters. At most one target may be given.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    /// Only entries about this user.
    pub target_user_id: Option<String>,
    /// Only entries about this registration.
    pub target_registration_id: Option<String>,
    /// Only entries performed by this caller.
    pub actor_id: Option<String>,
}

fn parse_filter(query: AuditQuery) -> Result<AuditFilter, Error> {
    let target = match (
        query.target_user_id.as_deref(),
        query.target_registration_id.as_deref(),
    ) {
        (Some(_), Some(_)) => return Err(conflicting_fields_error(TARGET_USER, TARGET_REGISTRATION)),
        (Some(user), None) => Some(AuditTarget::User(parse_user_id(user, TARGET_USER)?)),
        (None, Some(registration)) => Some(AuditTarget::Registration(parse_registration_id(
            registration,
            TARGET_REGISTRATION,
        )?)),
        (None, None) => None,
    };
    let actor = query
        .actor_id
        .as_deref()
        .map(|actor| parse_user_id(actor, FieldName::new("actorId")))
        .transpose()?;
    Ok(AuditFilter { target, actor })
}

/// List audit entries, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit entries", body = ActionEnvelope<Vec<AuditLogEntry>>),
        (status = 400, description = "Invalid filter", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["audit"],
    operation_id = "listAuditEntries"
)]
#[get("/admin/audit")]
pub async fn list_audit_entries(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AuditQuery>,
) -> ApiResult<web::Json<ActionEnvelope<Vec<AuditLogEntry>>>> {
    let caller = session.require_caller()?;
    let filter = parse_filter(query.into_inner())?;
    let outcome = state.audit.list_entries(&caller, filter).await?;
    Ok(web::Json(outcome.into()))
}
