//! Product Upgrade Repository
//!
//! Upgrade records are immutable history; there is no update or delete.

use super::{RepoError, RepoResult};
use shared::models::ProductUpgrade;
use sqlx::SqlitePool;

const UPGRADE_SELECT: &str = "SELECT id, member_id, old_product_id, new_product_id, \
     old_monthly_deposit, new_monthly_deposit, completed_periods_at_upgrade, \
     compensation_per_month, new_payment_with_compensation, created_at \
     FROM product_upgrade";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ProductUpgrade>> {
    let sql = format!("{UPGRADE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, ProductUpgrade>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The most recent upgrade for a member — the one `member.current_upgrade_id`
/// should point at.
pub async fn find_latest_by_member(
    pool: &SqlitePool,
    member_id: i64,
) -> RepoResult<Option<ProductUpgrade>> {
    let sql = format!("{UPGRADE_SELECT} WHERE member_id = ? ORDER BY created_at DESC LIMIT 1");
    let row = sqlx::query_as::<_, ProductUpgrade>(&sql)
        .bind(member_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The upgrade governing a member's current requirement terms.
///
/// Prefers `current_upgrade_id`; falls back to the latest record if the
/// pointer is stale. Members who never upgraded resolve to None.
pub async fn find_active_for_member(
    pool: &SqlitePool,
    member: &shared::models::Member,
) -> RepoResult<Option<ProductUpgrade>> {
    if !member.has_upgraded {
        return Ok(None);
    }
    if let Some(id) = member.current_upgrade_id
        && let Some(upgrade) = find_by_id(pool, id).await?
    {
        return Ok(Some(upgrade));
    }
    find_latest_by_member(pool, member.id).await
}

/// Full upgrade history, newest first
pub async fn find_by_member(pool: &SqlitePool, member_id: i64) -> RepoResult<Vec<ProductUpgrade>> {
    let sql = format!("{UPGRADE_SELECT} WHERE member_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, ProductUpgrade>(&sql)
        .bind(member_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert an upgrade record inside the execution transaction.
pub async fn create<'e, E>(executor: E, upgrade: &ProductUpgrade) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let rows = sqlx::query(
        "INSERT INTO product_upgrade (id, member_id, old_product_id, new_product_id, \
         old_monthly_deposit, new_monthly_deposit, completed_periods_at_upgrade, \
         compensation_per_month, new_payment_with_compensation, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(upgrade.id)
    .bind(upgrade.member_id)
    .bind(upgrade.old_product_id)
    .bind(upgrade.new_product_id)
    .bind(upgrade.old_monthly_deposit)
    .bind(upgrade.new_monthly_deposit)
    .bind(upgrade.completed_periods_at_upgrade)
    .bind(upgrade.compensation_per_month)
    .bind(upgrade.new_payment_with_compensation)
    .bind(upgrade.created_at)
    .execute(executor)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Database("Failed to create product upgrade".into()));
    }
    Ok(())
}
