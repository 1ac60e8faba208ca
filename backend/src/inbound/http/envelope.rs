//! Success envelope shared by every admin endpoint.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ActionOutcome;

/// Body of every successful response: `{success: true, message, data}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionEnvelope<T> {
    /// Always `true`.
    pub success: bool,
    /// Human-readable summary of what happened.
    pub message: String,
    /// Operation result.
    pub data: T,
}

impl<T> From<ActionOutcome<T>> for ActionEnvelope<T> {
    fn from(outcome: ActionOutcome<T>) -> Self {
        let (message, data) = outcome.into_parts();
        Self {
            success: true,
            message,
            data,
        }
    }
}
