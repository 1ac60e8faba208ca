//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path and body fields arrive as text. These helpers parse them into
//! domain identifiers and report failures as `validation_error` with the
//! offending field in `details`.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{Error, RegistrationId, RegistrationKind, Role, UserId};

/// Field-level failure codes carried in error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldErrorCode {
    InvalidUuid,
    InvalidRole,
    InvalidKind,
    Conflicting,
}

impl FieldErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidRole => "invalid_role",
            Self::InvalidKind => "invalid_kind",
            Self::Conflicting => "conflicting_fields",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: FieldErrorCode, value: &str) -> Error {
    Error::validation(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            FieldErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_user_id_list(values: &[String], field: FieldName) -> Result<Vec<UserId>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            UserId::new(value).map_err(|_| {
                Error::validation(format!("{} must contain valid UUIDs", field.as_str()))
                    .with_details(json!({
                        "field": field.as_str(),
                        "index": index,
                        "value": value,
                        "code": FieldErrorCode::InvalidUuid.as_str(),
                    }))
            })
        })
        .collect()
}

pub(crate) fn parse_registration_id(value: &str, field: FieldName) -> Result<RegistrationId, Error> {
    RegistrationId::new(value).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            FieldErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_registration_kind(
    value: &str,
    field: FieldName,
) -> Result<RegistrationKind, Error> {
    RegistrationKind::from_str(value).map_err(|_| {
        field_error(
            field,
            format!("{} must be alumni or company", field.as_str()),
            FieldErrorCode::InvalidKind,
            value,
        )
    })
}

pub(crate) fn parse_role(value: &str, field: FieldName) -> Result<Role, Error> {
    Role::from_str(value).map_err(|_| {
        field_error(
            field,
            format!("{} is not a known role", field.as_str()),
            FieldErrorCode::InvalidRole,
            value,
        )
    })
}

pub(crate) fn conflicting_fields_error(first: FieldName, second: FieldName) -> Error {
    Error::validation(format!(
        "{} and {} cannot be combined",
        first.as_str(),
        second.as_str()
    ))
    .with_details(json!({
        "fields": [first.as_str(), second.as_str()],
        "code": FieldErrorCode::Conflicting.as_str(),
    }))
}
