//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer. Conversions to domain
//! values live next to the adapters and reject unknown enum tags instead of
//! coercing them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{audit_log, registrations, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub status: String,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable user record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub status: &'a str,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role change applied under a revision check.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserRoleUpdate<'a> {
    pub role: &'a str,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

/// Row read from `registrations`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: Uuid,
    pub kind: String,
    pub applicant_email: String,
    pub details: serde_json::Value,
    pub evidence: Vec<String>,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub reject_reason: Option<String>,
    pub decided_by: Option<Uuid>,
}

/// Insertable registration record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub(crate) struct NewRegistrationRow<'a> {
    pub id: Uuid,
    pub kind: &'a str,
    pub applicant_email: &'a str,
    pub details: serde_json::Value,
    pub evidence: Vec<&'a str>,
    pub status: &'a str,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub reject_reason: Option<&'a str>,
    pub decided_by: Option<Uuid>,
}

/// Decision fields written when a pending registration is decided.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = registrations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RegistrationDecisionUpdate<'a> {
    pub status: &'a str,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub reject_reason: Option<&'a str>,
    pub decided_by: Option<Uuid>,
}

/// Row read from `audit_log`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditLogRow {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub target_kind: String,
    pub target_id: Uuid,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable audit entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
pub(crate) struct NewAuditLogRow<'a> {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: &'a str,
    pub target_kind: &'a str,
    pub target_id: Uuid,
    pub details: &'a str,
    pub created_at: DateTime<Utc>,
}
