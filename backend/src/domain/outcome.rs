//! Result payload returned by driving ports.

use serde::Serialize;

/// Successful operation result paired with a human-readable message.
///
/// Failures travel as [`crate::domain::Error`]; inbound adapters render both
/// into the same `{success, message, data}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome<T> {
    message: String,
    data: T,
}

impl<T> ActionOutcome<T> {
    /// Pair `data` with `message`.
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }

    /// Human-readable summary.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Operation payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Split into message and payload.
    pub fn into_parts(self) -> (String, T) {
        (self.message, self.data)
    }

    /// Transform the payload, keeping the message.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionOutcome<U> {
        ActionOutcome {
            message: self.message,
            data: f(self.data),
        }
    }
}
