//! PostgreSQL-backed `RegistrationRepository`.
//!
//! A decision is an `UPDATE ... WHERE status = 'pending'` plus the audit
//! insert, in one transaction. Zero updated rows means another reviewer won
//! or the registration is gone.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{
    DecisionOutcome, RegistrationDecision, RegistrationRepository, RegistrationRepositoryError,
};
use crate::domain::{Registration, RegistrationId, RegistrationStatus};

use super::diesel_error_mapping::{PortErrorCtors, map_diesel_error, map_pool_error};
use super::models::{RegistrationDecisionUpdate, RegistrationRow};
use super::pool::DbPool;
use super::row_conversions::{new_audit_row, new_registration_row, registration_from_row};
use super::schema::{audit_log, registrations};

const CTORS: PortErrorCtors<RegistrationRepositoryError> = PortErrorCtors {
    connection: RegistrationRepositoryError::connection,
    query: RegistrationRepositoryError::query,
    duplicate: Some(RegistrationRepositoryError::duplicate),
};

enum TxError {
    Diesel(diesel::result::Error),
    Row(String),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_tx_error(error: TxError) -> RegistrationRepositoryError {
    match error {
        TxError::Diesel(err) => map_diesel_error(err, &CTORS),
        TxError::Row(message) => RegistrationRepositoryError::query(message),
    }
}

fn convert(row: RegistrationRow) -> Result<Registration, TxError> {
    registration_from_row(row).map_err(TxError::Row)
}

/// Diesel implementation of [`RegistrationRepository`].
#[derive(Clone)]
pub struct DieselRegistrationRepository {
    pool: DbPool,
}

impl DieselRegistrationRepository {
    /// Repository backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn decide_in_transaction(
    conn: &mut AsyncPgConnection,
    decision: &RegistrationDecision,
) -> Result<DecisionOutcome, TxError> {
    let decided = &decision.decided;
    let id = *decided.id().as_uuid();
    let update = RegistrationDecisionUpdate {
        status: decided.status().as_str(),
        approved_at: decided.approved_at(),
        rejected_at: decided.rejected_at(),
        reject_reason: decided.reject_reason().map(AsRef::as_ref),
        decided_by: decided.decided_by().map(|user| *user.as_uuid()),
    };

    let updated: Option<RegistrationRow> = diesel::update(
        registrations::table
            .filter(registrations::id.eq(id))
            .filter(registrations::status.eq(RegistrationStatus::Pending.as_str())),
    )
    .set(&update)
    .returning(RegistrationRow::as_returning())
    .get_result(conn)
    .await
    .optional()?;

    let Some(row) = updated else {
        let current = registrations::table
            .filter(registrations::id.eq(id))
            .select(RegistrationRow::as_select())
            .first(conn)
            .await
            .optional()?;
        return match current {
            Some(row) => Ok(DecisionOutcome::AlreadyDecided(convert(row)?)),
            None => Ok(DecisionOutcome::Missing),
        };
    };

    diesel::insert_into(audit_log::table)
        .values(new_audit_row(&decision.audit))
        .execute(conn)
        .await?;
    Ok(DecisionOutcome::Applied(convert(row)?))
}

#[async_trait]
impl RegistrationRepository for DieselRegistrationRepository {
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, RegistrationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        let row = registrations::table
            .filter(registrations::id.eq(id.as_uuid()))
            .select(RegistrationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, &CTORS))?;
        row.map(registration_from_row)
            .transpose()
            .map_err(RegistrationRepositoryError::query)
    }

    async fn insert(&self, registration: &Registration) -> Result<(), RegistrationRepositoryError> {
        let row = new_registration_row(registration).map_err(RegistrationRepositoryError::query)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        diesel::insert_into(registrations::table)
            .values(row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, &CTORS))
    }

    async fn record_decision(
        &self,
        decision: RegistrationDecision,
    ) -> Result<DecisionOutcome, RegistrationRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        let outcome = conn
            .transaction::<_, TxError, _>(|conn| {
                async move { decide_in_transaction(conn, &decision).await }.scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;
        debug!(?outcome, "registration decision transaction finished");
        Ok(outcome)
    }
}
