//! Audit trail records.
//!
//! Entries are append-only. Each is written by the store in the same atomic
//! unit as the mutation it describes, so the trail never diverges from the
//! state it records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{RegistrationId, UserId};

/// Tagged operation name recorded with each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Unprivileged user elevated to administrator.
    PromoteToAdmin,
    /// Administrator returned to the unprivileged tier.
    DemoteFromAdmin,
    /// Administrator elevated to super-administrator.
    PromoteToSuperAdmin,
    /// Super-administrator returned to administrator.
    DemoteFromSuperAdmin,
    /// Administrator granted through a batch promotion.
    BatchPromoteToAdmin,
    /// Registration approved.
    ApproveRegistration,
    /// Registration rejected.
    RejectRegistration,
}

impl AuditAction {
    /// Every action tag.
    pub const ALL: [AuditAction; 7] = [
        Self::PromoteToAdmin,
        Self::DemoteFromAdmin,
        Self::PromoteToSuperAdmin,
        Self::DemoteFromSuperAdmin,
        Self::BatchPromoteToAdmin,
        Self::ApproveRegistration,
        Self::RejectRegistration,
    ];

    /// Returns the storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PromoteToAdmin => "promote_to_admin",
            Self::DemoteFromAdmin => "demote_from_admin",
            Self::PromoteToSuperAdmin => "promote_to_super_admin",
            Self::DemoteFromSuperAdmin => "demote_from_super_admin",
            Self::BatchPromoteToAdmin => "batch_promote_to_admin",
            Self::ApproveRegistration => "approve_registration",
            Self::RejectRegistration => "reject_registration",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown action tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown audit action: {input}")]
pub struct ParseAuditActionError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::str::FromStr for AuditAction {
    type Err = ParseAuditActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseAuditActionError {
                input: s.to_owned(),
            })
    }
}

/// Record an audit entry is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AuditTarget {
    /// A user record.
    #[schema(value_type = String)]
    User(UserId),
    /// A registration record.
    #[schema(value_type = String)]
    Registration(RegistrationId),
}

impl AuditTarget {
    /// Storage tag for the target kind.
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Registration(_) => "registration",
        }
    }

    /// Underlying identifier.
    pub fn as_uuid(&self) -> &Uuid {
        match self {
            Self::User(id) => id.as_uuid(),
            Self::Registration(id) => id.as_uuid(),
        }
    }

    /// Rebuild a target from its storage tag and identifier.
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "user" => Some(Self::User(UserId::from_uuid(id))),
            "registration" => Some(Self::Registration(RegistrationId::from_uuid(id))),
            _ => None,
        }
    }
}

impl fmt::Display for AuditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind_str(), self.as_uuid())
    }
}

/// Audit entry as submitted by a service, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    /// Caller who performed the operation.
    pub actor: UserId,
    /// Operation tag.
    pub action: AuditAction,
    /// Affected record.
    pub target: AuditTarget,
    /// Human-readable description.
    pub details: String,
    /// When the operation happened.
    pub recorded_at: DateTime<Utc>,
}

impl NewAuditEntry {
    /// Assign a fresh identifier, producing the stored form.
    pub fn into_entry(self) -> AuditLogEntry {
        self.into_entry_with_id(Uuid::new_v4())
    }

    /// Assign the given identifier, producing the stored form.
    pub fn into_entry_with_id(self, id: Uuid) -> AuditLogEntry {
        AuditLogEntry {
            id,
            actor: self.actor,
            action: self.action,
            target: self.target,
            details: self.details,
            created_at: self.recorded_at,
        }
    }
}

/// Stored audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Caller who performed the operation.
    #[schema(value_type = String)]
    #[serde(rename = "adminId")]
    pub actor: UserId,
    /// Operation tag.
    pub action: AuditAction,
    /// Affected record.
    pub target: AuditTarget,
    /// Human-readable description.
    pub details: String,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

/// Filter for audit queries. Empty filters match every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    /// Restrict to entries about this record.
    pub target: Option<AuditTarget>,
    /// Restrict to entries performed by this actor.
    pub actor: Option<UserId>,
}

impl AuditFilter {
    /// Whether `entry` satisfies the filter.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        let target_ok = self.target.as_ref().is_none_or(|t| *t == entry.target);
        let actor_ok = self.actor.as_ref().is_none_or(|a| *a == entry.actor);
        target_ok && actor_ok
    }
}
