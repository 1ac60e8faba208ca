//! Conversions between Diesel rows and domain values.
//!
//! Reads are strict: an unknown role, status or action tag is reported as an
//! error rather than coerced, since a coerced role could grant or drop
//! privileges silently.

use uuid::Uuid;

use crate::domain::{
    ApplicantDetails, AuditAction, AuditLogEntry, AuditTarget, DisplayName, EmailAddress,
    EvidenceRef, NewAuditEntry, Registration, RegistrationId, RegistrationKind, RegistrationParts,
    RegistrationStatus, RejectReason, Role, User, UserId, UserIdentity, Username,
    VerificationStatus,
};

use super::models::{
    AuditLogRow, NewAuditLogRow, NewRegistrationRow, NewUserRow, RegistrationRow, UserRow,
};

/// Cast a stored revision to the domain type.
#[expect(
    clippy::cast_sign_loss,
    reason = "revision column has a positive CHECK constraint"
)]
pub(crate) fn revision_from_db(revision: i32) -> u32 {
    revision as u32
}

/// Cast a domain revision for storage.
#[expect(
    clippy::cast_possible_wrap,
    reason = "revisions grow by one per role change and stay far below i32::MAX"
)]
pub(crate) fn revision_for_db(revision: u32) -> i32 {
    revision as i32
}

pub(crate) fn user_from_row(row: UserRow) -> Result<User, String> {
    let identity = UserIdentity {
        id: UserId::from_uuid(row.id),
        email: EmailAddress::new(&row.email).map_err(|err| err.to_string())?,
        username: Username::new(row.username).map_err(|err| err.to_string())?,
        display_name: DisplayName::new(row.display_name).map_err(|err| err.to_string())?,
    };
    let role = row.role.parse::<Role>().map_err(|err| err.to_string())?;
    let status = row
        .status
        .parse::<VerificationStatus>()
        .map_err(|err| err.to_string())?;
    Ok(User::restore(
        identity,
        role,
        status,
        revision_from_db(row.revision),
        (row.created_at, row.updated_at),
    ))
}

pub(crate) fn new_user_row(user: &User) -> NewUserRow<'_> {
    NewUserRow {
        id: *user.id().as_uuid(),
        email: user.email().as_ref(),
        username: user.username().as_ref(),
        display_name: user.display_name().as_ref(),
        role: user.role().as_str(),
        status: user.status().as_str(),
        revision: revision_for_db(user.revision()),
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    }
}

pub(crate) fn registration_from_row(row: RegistrationRow) -> Result<Registration, String> {
    let details: ApplicantDetails =
        serde_json::from_value(row.details).map_err(|err| err.to_string())?;
    let kind = row
        .kind
        .parse::<RegistrationKind>()
        .map_err(|err| err.to_string())?;
    if details.kind() != kind {
        return Err(format!(
            "registration {} stores {} details under kind {kind}",
            row.id,
            details.kind()
        ));
    }
    let evidence = row
        .evidence
        .into_iter()
        .map(EvidenceRef::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| err.to_string())?;
    let reject_reason = row
        .reject_reason
        .map(RejectReason::new)
        .transpose()
        .map_err(|err| err.to_string())?;
    Ok(Registration::restore(RegistrationParts {
        id: RegistrationId::from_uuid(row.id),
        applicant_email: EmailAddress::new(&row.applicant_email).map_err(|err| err.to_string())?,
        details,
        evidence,
        status: row
            .status
            .parse::<RegistrationStatus>()
            .map_err(|err| err.to_string())?,
        submitted_at: row.submitted_at,
        approved_at: row.approved_at,
        rejected_at: row.rejected_at,
        reject_reason,
        decided_by: row.decided_by.map(UserId::from_uuid),
    }))
}

pub(crate) fn new_registration_row(
    registration: &Registration,
) -> Result<NewRegistrationRow<'_>, String> {
    Ok(NewRegistrationRow {
        id: *registration.id().as_uuid(),
        kind: registration.kind().as_str(),
        applicant_email: registration.applicant_email().as_ref(),
        details: serde_json::to_value(registration.details()).map_err(|err| err.to_string())?,
        evidence: registration.evidence().iter().map(AsRef::as_ref).collect(),
        status: registration.status().as_str(),
        submitted_at: registration.submitted_at(),
        approved_at: registration.approved_at(),
        rejected_at: registration.rejected_at(),
        reject_reason: registration.reject_reason().map(AsRef::as_ref),
        decided_by: registration.decided_by().map(|id| *id.as_uuid()),
    })
}

pub(crate) fn audit_from_row(row: AuditLogRow) -> Result<AuditLogEntry, String> {
    let target = AuditTarget::from_parts(&row.target_kind, row.target_id)
        .ok_or_else(|| format!("unknown audit target kind: {}", row.target_kind))?;
    Ok(AuditLogEntry {
        id: row.id,
        actor: UserId::from_uuid(row.actor_id),
        action: row
            .action
            .parse::<AuditAction>()
            .map_err(|err| err.to_string())?,
        target,
        details: row.details,
        created_at: row.created_at,
    })
}

pub(crate) fn new_audit_row(entry: &NewAuditEntry) -> NewAuditLogRow<'_> {
    NewAuditLogRow {
        id: Uuid::new_v4(),
        actor_id: *entry.actor.as_uuid(),
        action: entry.action.as_str(),
        target_kind: entry.target.kind_str(),
        target_id: *entry.target.as_uuid(),
        details: &entry.details,
        created_at: entry.recorded_at,
    }
}
