//! Driving port for promoting many users at once.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ActionOutcome, CallerSession, Error, UserId};

/// Summary of a batch promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchPromotionReport {
    /// Distinct candidates considered after removing duplicates.
    pub requested: usize,
    /// Users actually promoted.
    #[schema(value_type = Vec<String>)]
    pub promoted: Vec<UserId>,
    /// Candidates left unchanged.
    #[schema(value_type = Vec<String>)]
    pub skipped: Vec<UserId>,
}

impl BatchPromotionReport {
    /// Number of users promoted.
    pub fn promoted_count(&self) -> usize {
        self.promoted.len()
    }
}

/// Driving port for batch promotion to administrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchPromotionCommand: Send + Sync {
    /// Promote every eligible candidate. Ineligible candidates are skipped
    /// rather than failing the batch.
    ///
    /// # Errors
    ///
    /// `ValidationError` for an empty candidate list and `Unauthorized` for
    /// non-super-administrator callers.
    async fn batch_promote_to_admin(
        &self,
        caller: &CallerSession,
        candidates: &[UserId],
    ) -> Result<ActionOutcome<BatchPromotionReport>, Error>;
}
