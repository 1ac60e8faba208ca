//! PostgreSQL-backed `UserDirectory`.
//!
//! Role changes run inside one transaction: optional floor check, caller
//! re-check, revision checked update, audit insert. The floor check locks
//! every qualifying super-administrator row with `SELECT ... FOR UPDATE`
//! before counting, so two concurrent demotions serialise and the second one
//! recounts after the first commits. The caller's own row is locked the same
//! way and must still carry the revision it was authorised against.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    BulkPromotion, RoleChange, RoleChangeOutcome, UserDirectory, UserDirectoryError,
};
use crate::domain::{
    AuditTarget, Capability, EmailAddress, NewAuditEntry, Role, User, UserId,
    VerificationStatus,
};

use super::diesel_error_mapping::{PortErrorCtors, map_diesel_error, map_pool_error};
use super::models::{UserRoleUpdate, UserRow};
use super::pool::DbPool;
use super::row_conversions::{new_audit_row, new_user_row, revision_for_db, user_from_row};
use super::schema::{audit_log, users};

const CTORS: PortErrorCtors<UserDirectoryError> = PortErrorCtors {
    connection: UserDirectoryError::connection,
    query: UserDirectoryError::query,
    duplicate: Some(UserDirectoryError::duplicate),
};

/// Failure inside a role-change transaction.
enum TxError {
    Diesel(diesel::result::Error),
    Row(String),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_tx_error(error: TxError) -> UserDirectoryError {
    match error {
        TxError::Diesel(err) => map_diesel_error(err, &CTORS),
        TxError::Row(message) => UserDirectoryError::query(message),
    }
}

fn convert(row: UserRow) -> Result<User, TxError> {
    user_from_row(row).map_err(TxError::Row)
}

/// Diesel implementation of [`UserDirectory`].
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Directory backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

async fn lock_qualifying_super_admins(
    conn: &mut AsyncPgConnection,
) -> Result<Vec<Uuid>, diesel::result::Error> {
    users::table
        .filter(users::role.eq(Role::SuperAdmin.as_str()))
        .filter(users::status.eq(VerificationStatus::Verified.as_str()))
        .select(users::id)
        .for_update()
        .load(conn)
        .await
}

fn remaining_except(locked: &[Uuid], target: Uuid) -> u64 {
    let others = locked.iter().filter(|id| **id != target).count();
    u64::try_from(others).unwrap_or(u64::MAX)
}

/// Lock the caller's row and confirm it still matches the authorised record.
async fn actor_unchanged(
    conn: &mut AsyncPgConnection,
    change: &RoleChange,
) -> Result<bool, TxError> {
    let actor = users::table
        .find(change.audit.actor.as_uuid())
        .select(UserRow::as_select())
        .for_update()
        .get_result(conn)
        .await
        .optional()?
        .map(convert)
        .transpose()?;
    Ok(actor.is_some_and(|actor| {
        actor.revision() == change.actor_revision
            && Capability::ManagePrivileges.permits(actor.role(), actor.status())
    }))
}

async fn insert_audit(
    conn: &mut AsyncPgConnection,
    entry: &NewAuditEntry,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(audit_log::table)
        .values(new_audit_row(entry))
        .execute(conn)
        .await
        .map(|_| ())
}

async fn apply_in_transaction(
    conn: &mut AsyncPgConnection,
    change: &RoleChange,
) -> Result<RoleChangeOutcome, TxError> {
    let target = *change.target.as_uuid();

    let floor_lock = match change.floor {
        Some(floor) => Some((floor, lock_qualifying_super_admins(conn).await?)),
        None => None,
    };

    if !actor_unchanged(conn, change).await? {
        return Ok(RoleChangeOutcome::ActorChanged);
    }

    if let Some((floor, locked)) = floor_lock {
        let remaining = remaining_except(&locked, target);
        if !floor.permits(remaining) {
            return Ok(RoleChangeOutcome::FloorViolated { remaining });
        }
    }

    let update = UserRoleUpdate {
        role: change.new_role.as_str(),
        revision: revision_for_db(change.expected_revision.saturating_add(1)),
        updated_at: change.changed_at,
    };
    let expected = revision_for_db(change.expected_revision);
    let updated: Option<UserRow> = if change.require_verified {
        diesel::update(
            users::table
                .filter(users::id.eq(target))
                .filter(users::revision.eq(expected))
                .filter(users::status.eq(VerificationStatus::Verified.as_str())),
        )
        .set(&update)
        .returning(UserRow::as_returning())
        .get_result(conn)
        .await
        .optional()?
    } else {
        diesel::update(
            users::table
                .filter(users::id.eq(target))
                .filter(users::revision.eq(expected)),
        )
        .set(&update)
        .returning(UserRow::as_returning())
        .get_result(conn)
        .await
        .optional()?
    };

    let Some(row) = updated else {
        let current = users::table
            .filter(users::id.eq(target))
            .select(UserRow::as_select())
            .first(conn)
            .await
            .optional()?
            .map(convert)
            .transpose()?;
        return Ok(RoleChangeOutcome::Stale { current });
    };

    insert_audit(conn, &change.audit).await?;
    Ok(RoleChangeOutcome::Applied(convert(row)?))
}

async fn bulk_promote_in_transaction(
    conn: &mut AsyncPgConnection,
    promotion: &BulkPromotion,
) -> Result<Vec<User>, TxError> {
    let targets: Vec<Uuid> = promotion.targets.iter().map(|id| *id.as_uuid()).collect();
    let eligible: Vec<&str> = promotion.eligible_roles.iter().map(|r| r.as_str()).collect();

    let rows: Vec<UserRow> = diesel::update(
        users::table
            .filter(users::id.eq_any(targets))
            .filter(users::role.eq_any(eligible))
            .filter(users::status.eq(VerificationStatus::Verified.as_str())),
    )
    .set((
        users::role.eq(promotion.new_role.as_str()),
        users::revision.eq(users::revision + 1),
        users::updated_at.eq(promotion.changed_at),
    ))
    .returning(UserRow::as_returning())
    .get_results(conn)
    .await?;

    let promoted = rows.into_iter().map(convert).collect::<Result<Vec<_>, _>>()?;
    let entries: Vec<NewAuditEntry> = promoted
        .iter()
        .map(|user| NewAuditEntry {
            actor: promotion.actor.clone(),
            action: promotion.action,
            target: AuditTarget::User(user.id().clone()),
            details: promotion.details.clone(),
            recorded_at: promotion.changed_at,
        })
        .collect();
    if !entries.is_empty() {
        let audit_rows: Vec<_> = entries.iter().map(new_audit_row).collect();
        diesel::insert_into(audit_log::table)
            .values(&audit_rows)
            .execute(conn)
            .await?;
    }
    Ok(promoted)
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, &CTORS))?;
        row.map(user_from_row)
            .transpose()
            .map_err(UserDirectoryError::query)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, &CTORS))?;
        row.map(user_from_row)
            .transpose()
            .map_err(UserDirectoryError::query)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserDirectoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, &CTORS))?;
        rows.into_iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(UserDirectoryError::query)
    }

    async fn insert(&self, user: &User) -> Result<(), UserDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        diesel::insert_into(users::table)
            .values(new_user_row(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, &CTORS))
    }

    async fn count_qualifying_super_admins(&self) -> Result<u64, UserDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        let count: i64 = users::table
            .filter(users::role.eq(Role::SuperAdmin.as_str()))
            .filter(users::status.eq(VerificationStatus::Verified.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, &CTORS))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn apply_role_change(
        &self,
        change: RoleChange,
    ) -> Result<RoleChangeOutcome, UserDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        let outcome = conn
            .transaction::<_, TxError, _>(|conn| {
                async move { apply_in_transaction(conn, &change).await }.scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;
        debug!(?outcome, "role change transaction finished");
        Ok(outcome)
    }

    async fn bulk_promote(&self, promotion: BulkPromotion) -> Result<Vec<User>, UserDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, &CTORS))?;
        conn.transaction::<_, TxError, _>(|conn| {
            async move { bulk_promote_in_transaction(conn, &promotion).await }.scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn row_errors_become_query_errors() {
        let mapped = map_tx_error(TxError::Row("unknown role: owner".to_owned()));
        assert_eq!(mapped, UserDirectoryError::query("unknown role: owner"));
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[Uuid::nil()], 0)]
    #[case(&[Uuid::nil(), Uuid::from_u128(7)], 1)]
    fn remaining_excludes_the_target(#[case] locked: &[Uuid], #[case] expected: u64) {
        assert_eq!(remaining_except(locked, Uuid::nil()), expected);
    }

    #[rstest]
    fn diesel_not_found_is_a_query_error() {
        let mapped = map_tx_error(TxError::Diesel(diesel::result::Error::NotFound));
        assert!(matches!(mapped, UserDirectoryError::Query { .. }));
    }
}
