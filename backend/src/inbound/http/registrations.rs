//! Registration review HTTP handlers.
//!
//! ```text
//! POST /api/v1/admin/registrations/{kind}/{id}/approve
//! POST /api/v1/admin/registrations/{kind}/{id}/reject {"reason":"..."}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Registration, RegistrationId, RegistrationKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::ActionEnvelope;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_registration_id, parse_registration_kind};

/// Request body for rejecting a registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[schema(example = "Graduation record could not be matched")]
    pub reason: String,
}

fn parse_path(path: web::Path<(String, String)>) -> Result<(RegistrationKind, RegistrationId), Error> {
    let (kind, id) = path.into_inner();
    Ok((
        parse_registration_kind(&kind, FieldName::new("kind"))?,
        parse_registration_id(&id, FieldName::new("id"))?,
    ))
}

/// Approve a pending registration.
#[utoipa::path(
    post,
    path = "/api/v1/admin/registrations/{kind}/{id}/approve",
    params(
        ("kind" = String, Path, description = "`alumni` or `company`"),
        ("id" = String, Path, description = "Registration id")
    ),
    responses(
        (status = 200, description = "Registration approved", body = ActionEnvelope<Registration>),
        (status = 400, description = "Invalid path", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Registration not found", body = ErrorEnvelope),
        (status = 409, description = "Registration already decided", body = ErrorEnvelope)
    ),
    tags = ["registrations"],
    operation_id = "approveRegistration"
)]
#[post("/admin/registrations/{kind}/{id}/approve")]
pub async fn approve_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<ActionEnvelope<Registration>>> {
    let caller = session.require_caller()?;
    let (kind, id) = parse_path(path)?;
    let outcome = state.registrations.approve(&caller, kind, id).await?;
    Ok(web::Json(outcome.into()))
}

/// Reject a pending registration with a reason.
#[utoipa::path(
    post,
    path = "/api/v1/admin/registrations/{kind}/{id}/reject",
    params(
        ("kind" = String, Path, description = "`alumni` or `company`"),
        ("id" = String, Path, description = "Registration id")
    ),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Registration rejected", body = ActionEnvelope<Registration>),
        (status = 400, description = "Invalid path or empty reason", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Registration not found", body = ErrorEnvelope),
        (status = 409, description = "Registration already decided", body = ErrorEnvelope)
    ),
    tags = ["registrations"],
    operation_id = "rejectRegistration"
)]
#[post("/admin/registrations/{kind}/{id}/reject")]
pub async fn reject_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    payload: web::Json<RejectRequest>,
) -> ApiResult<web::Json<ActionEnvelope<Registration>>> {
    let caller = session.require_caller()?;
    let (kind, id) = parse_path(path)?;
    let outcome = state
        .registrations
        .reject(&caller, kind, id, &payload.reason)
        .await?;
    Ok(web::Json(outcome.into()))
}
