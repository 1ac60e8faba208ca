//! Privilege administration HTTP handlers.
//!
//! ```text
//! POST /api/v1/admin/users/{id}/promote-admin
//! POST /api/v1/admin/users/{id}/demote-admin
//! POST /api/v1/admin/users/{id}/promote-super-admin
//! POST /api/v1/admin/users/{id}/demote-super-admin
//! POST /api/v1/admin/admins {"email":"ada@example.org","role":"admin"}
//! POST /api/v1/admin/admins/remove {"email":"ada@example.org"}
//! POST /api/v1/admin/users/batch-promote-admin {"userIds":["..."]}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::BatchPromotionReport;
use crate::domain::User;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::ActionEnvelope;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_role, parse_user_id, parse_user_id_list};

const USER_ID_FIELD: FieldName = FieldName::new("id");

/// Request body for `POST /api/v1/admin/admins`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddAdminRequest {
    #[schema(example = "ada@example.org")]
    pub email: String,
    /// `admin` or `superadmin`.
    #[schema(example = "admin")]
    pub role: String,
}

/// Request body for `POST /api/v1/admin/admins/remove`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAdminRequest {
    #[schema(example = "ada@example.org")]
    pub email: String,
}

/// Request body for `POST /api/v1/admin/users/batch-promote-admin`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchPromoteRequest {
    pub user_ids: Vec<String>,
}

type UserEnvelope = ApiResult<web::Json<ActionEnvelope<User>>>;

/// Promote a verified, unprivileged user to administrator.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/promote-admin",
    params(("id" = String, Path, description = "Target user id")),
    responses(
        (status = 200, description = "User promoted", body = ActionEnvelope<User>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Target not found", body = ErrorEnvelope),
        (status = 409, description = "Target not eligible", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "promoteToAdmin"
)]
#[post("/admin/users/{id}/promote-admin")]
pub async fn promote_to_admin(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> UserEnvelope {
    let caller = session.require_caller()?;
    let target = parse_user_id(&path.into_inner(), USER_ID_FIELD)?;
    let outcome = state.roles.promote_to_admin(&caller, &target).await?;
    Ok(web::Json(outcome.into()))
}

/// Return an administrator to the unprivileged tier.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/demote-admin",
    params(("id" = String, Path, description = "Target user id")),
    responses(
        (status = 200, description = "User demoted", body = ActionEnvelope<User>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Caller targeted themself", body = ErrorEnvelope),
        (status = 404, description = "Target not found", body = ErrorEnvelope),
        (status = 409, description = "Target not an administrator", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "demoteFromAdmin"
)]
#[post("/admin/users/{id}/demote-admin")]
pub async fn demote_from_admin(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> UserEnvelope {
    let caller = session.require_caller()?;
    let target = parse_user_id(&path.into_inner(), USER_ID_FIELD)?;
    let outcome = state.roles.demote_from_admin(&caller, &target).await?;
    Ok(web::Json(outcome.into()))
}

/// Promote a verified administrator to super-administrator.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/promote-super-admin",
    params(("id" = String, Path, description = "Target user id")),
    responses(
        (status = 200, description = "User promoted", body = ActionEnvelope<User>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Target not found", body = ErrorEnvelope),
        (status = 409, description = "Target not eligible", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "promoteToSuperAdmin"
)]
#[post("/admin/users/{id}/promote-super-admin")]
pub async fn promote_to_super_admin(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> UserEnvelope {
    let caller = session.require_caller()?;
    let target = parse_user_id(&path.into_inner(), USER_ID_FIELD)?;
    let outcome = state.roles.promote_to_super_admin(&caller, &target).await?;
    Ok(web::Json(outcome.into()))
}

/// Return a super-administrator to administrator.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/demote-super-admin",
    params(("id" = String, Path, description = "Target user id")),
    responses(
        (status = 200, description = "User demoted", body = ActionEnvelope<User>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Caller targeted themself", body = ErrorEnvelope),
        (status = 404, description = "Target not found", body = ErrorEnvelope),
        (status = 409, description = "Last super-administrator or wrong role", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "demoteFromSuperAdmin"
)]
#[post("/admin/users/{id}/demote-super-admin")]
pub async fn demote_from_super_admin(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> UserEnvelope {
    let caller = session.require_caller()?;
    let target = parse_user_id(&path.into_inner(), USER_ID_FIELD)?;
    let outcome = state.roles.demote_from_super_admin(&caller, &target).await?;
    Ok(web::Json(outcome.into()))
}

/// Grant a privileged role to the user registered under an email.
#[utoipa::path(
    post,
    path = "/api/v1/admin/admins",
    request_body = AddAdminRequest,
    responses(
        (status = 200, description = "Role granted", body = ActionEnvelope<User>),
        (status = 400, description = "Invalid email or role", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "No user with that email", body = ErrorEnvelope),
        (status = 409, description = "Target not eligible", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "addAdminByEmail"
)]
#[post("/admin/admins")]
pub async fn add_admin_by_email(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AddAdminRequest>,
) -> UserEnvelope {
    let caller = session.require_caller()?;
    let AddAdminRequest { email, role } = payload.into_inner();
    let role = parse_role(&role, FieldName::new("role"))?;
    let outcome = state.roles.add_admin_by_email(&caller, &email, role).await?;
    Ok(web::Json(outcome.into()))
}

/// Strip privileges from the user registered under an email.
#[utoipa::path(
    post,
    path = "/api/v1/admin/admins/remove",
    request_body = RemoveAdminRequest,
    responses(
        (status = 200, description = "Privileges removed", body = ActionEnvelope<User>),
        (status = 400, description = "Invalid email", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Caller targeted themself", body = ErrorEnvelope),
        (status = 404, description = "No user with that email", body = ErrorEnvelope),
        (status = 409, description = "Last super-administrator or not privileged", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "removeAdminByEmail"
)]
#[post("/admin/admins/remove")]
pub async fn remove_admin_by_email(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RemoveAdminRequest>,
) -> UserEnvelope {
    let caller = session.require_caller()?;
    let outcome = state
        .roles
        .remove_admin_by_email(&caller, &payload.email)
        .await?;
    Ok(web::Json(outcome.into()))
}

/// Promote every eligible user in a list to administrator.
///
/// Ineligible or unknown ids are skipped, not failed; the report lists both.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/batch-promote-admin",
    request_body = BatchPromoteRequest,
    responses(
        (status = 200, description = "Batch processed", body = ActionEnvelope<BatchPromotionReport>),
        (status = 400, description = "Empty or malformed id list", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["admin"],
    operation_id = "batchPromoteToAdmin"
)]
#[post("/admin/users/batch-promote-admin")]
pub async fn batch_promote_to_admin(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BatchPromoteRequest>,
) -> ApiResult<web::Json<ActionEnvelope<BatchPromotionReport>>> {
    let caller = session.require_caller()?;
    let targets = parse_user_id_list(&payload.user_ids, FieldName::new("userIds"))?;
    let outcome = state.batch.batch_promote_to_admin(&caller, &targets).await?;
    Ok(web::Json(outcome.into()))
}

#[cfg(test)]
#[path = "admin_roles_tests.rs"]
mod tests;
