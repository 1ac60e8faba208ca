//! PostgreSQL-backed `AuditLogRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};
use crate::domain::{AuditFilter, AuditLogEntry};

use super::diesel_error_mapping::{PortErrorCtors, map_diesel_error, map_pool_error};
use super::models::AuditLogRow;
use super::pool::DbPool;
use super::row_conversions::audit_from_row;
use super::schema::audit_log;

const CTORS: PortErrorCtors<AuditLogRepositoryError> = PortErrorCtors {
    connection: AuditLogRepositoryError::connection,
    query: AuditLogRepositoryError::query,
    duplicate: None,
};

/// Diesel implementation of [`AuditLogRepository`].
#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: DbPool,
}

impl DieselAuditLogRepository {
    /// Repository backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for DieselAuditLogRepository {
    async fn list(&self, filter: &AuditFilter) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;

        let mut query = audit_log::table.into_boxed();
        if let Some(target) = &filter.target {
            query = query
                .filter(audit_log::target_kind.eq(target.kind_str()))
                .filter(audit_log::target_id.eq(*target.as_uuid()));
        }
        if let Some(actor) = &filter.actor {
            query = query.filter(audit_log::actor_id.eq(*actor.as_uuid()));
        }

        let rows: Vec<AuditLogRow> = query
            .select(AuditLogRow::as_select())
            .order_by((audit_log::created_at.desc(), audit_log::id.desc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, &CTORS))?;

        rows.into_iter()
            .map(audit_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AuditLogRepositoryError::query)
    }
}
