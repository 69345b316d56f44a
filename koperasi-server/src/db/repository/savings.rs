//! Savings Repository
//!
//! Installment payment records. There is deliberately no uniqueness
//! constraint on (member, period): partial installments accumulate as
//! separate rows. The only guard is against two simultaneously Pending
//! deposits for the same period.

use super::{RepoError, RepoResult};
use shared::models::{SavingsRecord, SavingsStatus};
use sqlx::SqlitePool;

const SAVINGS_SELECT: &str = "SELECT id, member_id, product_id, installment_period, amount, \
     status, savings_type, payment_type, partial_sequence, rejection_reason, proof_file, \
     savings_date, payment_date, created_at, updated_at FROM savings";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<SavingsRecord>> {
    let sql = format!("{SAVINGS_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, SavingsRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Every record for a member across all products and statuses — the
/// reconciliation engine's raw input. Newest first for list views.
pub async fn find_by_member(pool: &SqlitePool, member_id: i64) -> RepoResult<Vec<SavingsRecord>> {
    let sql = format!("{SAVINGS_SELECT} WHERE member_id = ? ORDER BY savings_date DESC");
    let rows = sqlx::query_as::<_, SavingsRecord>(&sql)
        .bind(member_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Duplicate-pending guard: is there already a Pending deposit for this
/// (member, period)?
pub async fn has_pending_for_period(
    pool: &SqlitePool,
    member_id: i64,
    period: i64,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM savings WHERE member_id = ?1 AND installment_period = ?2 \
         AND status = 'Pending' AND savings_type = 'Setoran'",
    )
    .bind(member_id)
    .bind(period)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Number of existing submissions for a (member, period), used to derive
/// `partial_sequence` for the next one.
pub async fn count_for_period(pool: &SqlitePool, member_id: i64, period: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM savings WHERE member_id = ?1 AND installment_period = ?2",
    )
    .bind(member_id)
    .bind(period)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, record: &SavingsRecord) -> RepoResult<SavingsRecord> {
    sqlx::query(
        "INSERT INTO savings (id, member_id, product_id, installment_period, amount, status, \
         savings_type, payment_type, partial_sequence, rejection_reason, proof_file, \
         savings_date, payment_date, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )
    .bind(record.id)
    .bind(record.member_id)
    .bind(record.product_id)
    .bind(record.installment_period)
    .bind(record.amount)
    .bind(record.status)
    .bind(record.savings_type)
    .bind(record.payment_type)
    .bind(record.partial_sequence)
    .bind(&record.rejection_reason)
    .bind(&record.proof_file)
    .bind(record.savings_date)
    .bind(record.payment_date)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;
    find_by_id(pool, record.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create savings record".into()))
}

/// Move a record out of Pending. `rejection_reason` is stored only for
/// rejections and cleared on approval.
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    status: SavingsStatus,
    rejection_reason: Option<&str>,
) -> RepoResult<SavingsRecord> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE savings SET status = ?1, rejection_reason = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(status)
    .bind(rejection_reason)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Savings record {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Savings record {id} not found")))
}
