//! Alumni and corporate registration requests.
//!
//! Both kinds share one record shape. Kind-specific applicant details live in
//! [`ApplicantDetails`]; the decision fields (`approvedAt`, `rejectedAt`,
//! `rejectReason`, `decidedBy`) exist on every registration so neither kind
//! loses its decision trail.
//!
//! Status moves `pending → approved` or `pending → rejected` exactly once.
//! [`Registration::approve`] and [`Registration::reject`] compute the next
//! record; they never mutate in place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{EmailAddress, UserId};

/// Validation errors for registration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Identifier was not a UUID.
    #[error("registration id must be a valid UUID")]
    InvalidId,
    /// Unknown registration kind.
    #[error("unknown registration kind: {input}")]
    UnknownKind {
        /// The rejected input.
        input: String,
    },
    /// Unknown registration status.
    #[error("unknown registration status: {input}")]
    UnknownStatus {
        /// The rejected input.
        input: String,
    },
    /// Rejection reason was blank.
    #[error("a rejection reason is required")]
    EmptyRejectReason,
    /// Evidence reference was blank.
    #[error("evidence reference must not be empty")]
    EmptyEvidenceRef,
}

/// Registration identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Parse a registration identifier.
    pub fn new(id: impl AsRef<str>) -> Result<Self, RegistrationValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| RegistrationValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RegistrationId> for String {
    fn from(value: RegistrationId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for RegistrationId {
    type Error = RegistrationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Which applicant workflow a registration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationKind {
    /// Alumni applicant.
    Alumni,
    /// Corporate applicant.
    Company,
}

impl RegistrationKind {
    /// Returns the storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alumni => "alumni",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for RegistrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegistrationKind {
    type Err = RegistrationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alumni" => Ok(Self::Alumni),
            "company" => Ok(Self::Company),
            other => Err(RegistrationValidationError::UnknownKind {
                input: other.to_owned(),
            }),
        }
    }
}

/// Registration lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted. Terminal.
    Approved,
    /// Declined. Terminal.
    Rejected,
}

impl RegistrationStatus {
    /// Returns the storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether no further transition is legal.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegistrationStatus {
    type Err = RegistrationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(RegistrationValidationError::UnknownStatus {
                input: other.to_owned(),
            }),
        }
    }
}

/// Rejection reason, kept exactly as written. Must contain more than
/// whitespace.
///
/// # Examples
/// ```
/// use placement_backend::domain::RejectReason;
///
/// let reason = RejectReason::new("  incomplete documents ").expect("valid reason");
/// assert_eq!(reason.as_ref(), "  incomplete documents ");
/// assert!(RejectReason::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RejectReason(String);

impl RejectReason {
    /// Validate a rejection reason.
    pub fn new(reason: impl Into<String>) -> Result<Self, RegistrationValidationError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(RegistrationValidationError::EmptyRejectReason);
        }
        Ok(Self(reason))
    }
}

impl AsRef<str> for RejectReason {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<RejectReason> for String {
    fn from(value: RejectReason) -> Self {
        value.0
    }
}

impl TryFrom<String> for RejectReason {
    type Error = RegistrationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque storage key for an uploaded evidence document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EvidenceRef(String);

impl EvidenceRef {
    /// Wrap a storage key.
    pub fn new(key: impl Into<String>) -> Result<Self, RegistrationValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RegistrationValidationError::EmptyEvidenceRef);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for EvidenceRef {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EvidenceRef> for String {
    fn from(value: EvidenceRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for EvidenceRef {
    type Error = RegistrationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Kind-specific applicant information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ApplicantDetails {
    /// Alumni applicant.
    Alumni {
        /// Legal name.
        full_name: String,
        /// Year of graduation.
        graduation_year: i32,
        /// Department graduated from.
        department: String,
    },
    /// Corporate applicant.
    Company {
        /// Registered company name.
        company_name: String,
        /// Government tax identifier.
        tax_id: String,
        /// Person submitting on behalf of the company.
        contact_name: String,
    },
}

impl ApplicantDetails {
    /// The workflow these details belong to.
    pub const fn kind(&self) -> RegistrationKind {
        match self {
            Self::Alumni { .. } => RegistrationKind::Alumni,
            Self::Company { .. } => RegistrationKind::Company,
        }
    }
}

/// Error raised when a transition is attempted from a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("registration is already {status}")]
pub struct NotPendingError {
    /// Status the registration is in.
    pub status: RegistrationStatus,
}

/// Stored fields of a registration, used to restore a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationParts {
    /// Identifier.
    pub id: RegistrationId,
    /// Applicant email.
    pub applicant_email: EmailAddress,
    /// Kind-specific details.
    pub details: ApplicantDetails,
    /// Evidence storage keys.
    pub evidence: Vec<EvidenceRef>,
    /// Lifecycle status.
    pub status: RegistrationStatus,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Rejection timestamp.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Rejection reason.
    pub reject_reason: Option<RejectReason>,
    /// Reviewer who decided.
    pub decided_by: Option<UserId>,
}

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[schema(value_type = String)]
    id: RegistrationId,
    #[schema(value_type = String, example = "applicant@example.org")]
    applicant_email: EmailAddress,
    kind: RegistrationKind,
    details: ApplicantDetails,
    #[schema(value_type = Vec<String>)]
    evidence: Vec<EvidenceRef>,
    status: RegistrationStatus,
    submitted_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    reject_reason: Option<RejectReason>,
    #[schema(value_type = Option<String>)]
    decided_by: Option<UserId>,
}

impl Registration {
    /// A freshly submitted, pending registration.
    pub fn submitted(
        id: RegistrationId,
        applicant_email: EmailAddress,
        details: ApplicantDetails,
        evidence: Vec<EvidenceRef>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::restore(RegistrationParts {
            id,
            applicant_email,
            details,
            evidence,
            status: RegistrationStatus::Pending,
            submitted_at,
            approved_at: None,
            rejected_at: None,
            reject_reason: None,
            decided_by: None,
        })
    }

    /// Restore a stored registration.
    pub fn restore(parts: RegistrationParts) -> Self {
        let RegistrationParts {
            id,
            applicant_email,
            details,
            evidence,
            status,
            submitted_at,
            approved_at,
            rejected_at,
            reject_reason,
            decided_by,
        } = parts;
        Self {
            id,
            applicant_email,
            kind: details.kind(),
            details,
            evidence,
            status,
            submitted_at,
            approved_at,
            rejected_at,
            reject_reason,
            decided_by,
        }
    }

    /// Compute the approved form of this registration.
    pub fn approve(&self, reviewer: &UserId, at: DateTime<Utc>) -> Result<Self, NotPendingError> {
        self.ensure_pending()?;
        Ok(Self {
            status: RegistrationStatus::Approved,
            approved_at: Some(at),
            decided_by: Some(reviewer.clone()),
            ..self.clone()
        })
    }

    /// Compute the rejected form of this registration.
    pub fn reject(
        &self,
        reviewer: &UserId,
        reason: RejectReason,
        at: DateTime<Utc>,
    ) -> Result<Self, NotPendingError> {
        self.ensure_pending()?;
        Ok(Self {
            status: RegistrationStatus::Rejected,
            rejected_at: Some(at),
            reject_reason: Some(reason),
            decided_by: Some(reviewer.clone()),
            ..self.clone()
        })
    }

    fn ensure_pending(&self) -> Result<(), NotPendingError> {
        match self.status {
            RegistrationStatus::Pending => Ok(()),
            status @ (RegistrationStatus::Approved | RegistrationStatus::Rejected) => {
                Err(NotPendingError { status })
            }
        }
    }

    /// Identifier.
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Applicant email.
    pub fn applicant_email(&self) -> &EmailAddress {
        &self.applicant_email
    }

    /// Workflow kind.
    pub fn kind(&self) -> RegistrationKind {
        self.kind
    }

    /// Kind-specific details.
    pub fn details(&self) -> &ApplicantDetails {
        &self.details
    }

    /// Evidence storage keys.
    pub fn evidence(&self) -> &[EvidenceRef] {
        &self.evidence
    }

    /// Lifecycle status.
    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    /// Submission timestamp.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Approval timestamp, once approved.
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Rejection timestamp, once rejected.
    pub fn rejected_at(&self) -> Option<DateTime<Utc>> {
        self.rejected_at
    }

    /// Rejection reason, once rejected.
    pub fn reject_reason(&self) -> Option<&RejectReason> {
        self.reject_reason.as_ref()
    }

    /// Reviewer who made the decision.
    pub fn decided_by(&self) -> Option<&UserId> {
        self.decided_by.as_ref()
    }
}
