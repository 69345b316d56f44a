//! Member Repository

use super::{RepoError, RepoResult};
use shared::models::{Member, MemberCreate, MemberUpdate};
use sqlx::SqlitePool;

const MEMBER_SELECT: &str = "SELECT id, uuid, name, phone, product_id, has_upgraded, \
     current_upgrade_id, savings_start_date, is_completed, notes, is_active, \
     created_at, updated_at FROM member";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE is_active = 1 ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Member>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: MemberCreate) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let uuid = shared::util::new_uuid();
    // savings_start_date defaults to creation time; it anchors period 1
    let start = data.savings_start_date.unwrap_or(now);
    sqlx::query(
        "INSERT INTO member (id, uuid, name, phone, product_id, has_upgraded, \
         current_upgrade_id, savings_start_date, is_completed, notes, is_active, \
         created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, ?6, 0, ?7, 1, ?8, ?8)",
    )
    .bind(id)
    .bind(&uuid)
    .bind(&data.name)
    .bind(&data.phone)
    .bind(data.product_id)
    .bind(start)
    .bind(&data.notes)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MemberUpdate) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), \
         product_id = COALESCE(?3, product_id), \
         savings_start_date = COALESCE(?4, savings_start_date), \
         is_completed = COALESCE(?5, is_completed), notes = COALESCE(?6, notes), \
         is_active = COALESCE(?7, is_active), updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(data.product_id)
    .bind(data.savings_start_date)
    .bind(data.is_completed)
    .bind(&data.notes)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Apply an executed product upgrade to the member row.
///
/// Runs inside the upgrade-execution transaction so the upgrade record and
/// the member's pointer to it commit atomically.
pub async fn apply_upgrade<'e, E>(
    executor: E,
    member_id: i64,
    upgrade_id: i64,
    new_product_id: i64,
) -> RepoResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET has_upgraded = 1, current_upgrade_id = ?1, product_id = ?2, \
         updated_at = ?3 WHERE id = ?4 AND is_active = 1",
    )
    .bind(upgrade_id)
    .bind(new_product_id)
    .bind(now)
    .bind(member_id)
    .execute(executor)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {member_id} not found")));
    }
    Ok(())
}

pub async fn set_completed(pool: &SqlitePool, id: i64, completed: bool) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE member SET is_completed = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(completed)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}
