//! Product Upgrade API Handlers
//!
//! `calculate` is a read-only preview; `execute` re-runs the same
//! computation against current database state and refuses to persist if
//! the client's numbers no longer match. Both the upgrade record and the
//! member's pointer to it commit in one transaction, serialized against
//! payment submission via the per-member lock.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use shared::models::{Member, Product, ProductUpgrade};

use crate::core::ServerState;
use crate::db::repository::{member, product, product_upgrade, savings};
use crate::reconciliation::{self, MONEY_TOLERANCE, UpgradeCalculation, UpgradeTerms};
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatePayload {
    pub member_id: i64,
    pub new_product_id: i64,
}

/// `execute` echoes back the calculation the admin reviewed so the server
/// can detect that payments were approved (or another upgrade ran) in
/// between.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutePayload {
    pub member_id: i64,
    pub new_product_id: i64,
    pub calculation: UpgradeCalculation,
}

async fn require_member(pool: &SqlitePool, member_id: i64) -> AppResult<Member> {
    let member = member::find_by_id(pool, member_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {member_id}")))?;
    if !member.is_active {
        return Err(AppError::not_found(format!("Member {member_id}")));
    }
    Ok(member)
}

fn money_matches(a: f64, b: f64) -> bool {
    let diff = reconciliation::to_decimal(a) - reconciliation::to_decimal(b);
    diff.abs() <= MONEY_TOLERANCE
}

/// Load member + both products and run the compensation calculation
/// against the member's current approved payments.
async fn compute_upgrade(
    pool: &SqlitePool,
    member_id: i64,
    new_product_id: i64,
) -> AppResult<(Member, Product, Product, UpgradeCalculation)> {
    let member = require_member(pool, member_id).await?;
    let current_product_id = member
        .product_id
        .ok_or_else(|| AppError::validation("Member has no savings product assigned"))?;
    if current_product_id == new_product_id {
        return Err(AppError::conflict(format!(
            "Member {member_id} is already on product {new_product_id}"
        )));
    }

    let old_product = product::find_by_id(pool, current_product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {current_product_id}")))?;
    let new_product = product::find_by_id(pool, new_product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {new_product_id}")))?;

    // Completed periods are counted under the requirement terms in force
    // right now, including any earlier upgrade's compensation
    let records = savings::find_by_member(pool, member_id).await?;
    let upgrade = product_upgrade::find_active_for_member(pool, &member).await?;
    let terms = upgrade.as_ref().map(UpgradeTerms::from);
    let completed =
        reconciliation::count_completed_periods(&records, old_product.deposit_amount, terms.as_ref());

    let calc = reconciliation::calculate_upgrade(
        old_product.deposit_amount,
        new_product.deposit_amount,
        completed,
        new_product.term_duration,
    )?;
    Ok((member, old_product, new_product, calc))
}

/// POST /api/admin/product-upgrade/calculate - 升级补偿预览 (只读)
pub async fn calculate(
    State(state): State<ServerState>,
    Json(payload): Json<CalculatePayload>,
) -> AppResult<Json<AppResponse<UpgradeCalculation>>> {
    let (_, _, _, calc) =
        compute_upgrade(&state.pool, payload.member_id, payload.new_product_id).await?;
    Ok(ok(calc))
}

/// POST /api/admin/product-upgrade/execute - 执行升级
///
/// Recomputes from database state under the member lock and rejects the
/// request with 409 if the echoed calculation is stale.
pub async fn execute(
    State(state): State<ServerState>,
    Json(payload): Json<ExecutePayload>,
) -> AppResult<Json<AppResponse<ProductUpgrade>>> {
    let record = execute_upgrade(&state, payload).await?;
    Ok(ok(record))
}

/// Execute an upgrade. Exposed for integration tests.
pub async fn execute_upgrade(
    state: &ServerState,
    payload: ExecutePayload,
) -> AppResult<ProductUpgrade> {
    let lock = state.member_lock(payload.member_id);
    let _guard = lock.lock().await;

    let (member, old_product, new_product, fresh) =
        compute_upgrade(&state.pool, payload.member_id, payload.new_product_id).await?;

    let echoed = &payload.calculation;
    let stale = echoed.completed_periods != fresh.completed_periods
        || echoed.total_periods != fresh.total_periods
        || !money_matches(echoed.compensation_per_month, fresh.compensation_per_month)
        || !money_matches(
            echoed.new_payment_with_compensation,
            fresh.new_payment_with_compensation,
        );
    if stale {
        tracing::warn!(
            member_id = member.id,
            echoed_completed = echoed.completed_periods,
            fresh_completed = fresh.completed_periods,
            "Rejecting stale upgrade calculation"
        );
        return Err(AppError::conflict(
            "Upgrade calculation is out of date; recalculate and try again",
        ));
    }

    let now = shared::util::now_millis();
    let record = ProductUpgrade {
        id: shared::util::snowflake_id(),
        member_id: member.id,
        old_product_id: old_product.id,
        new_product_id: new_product.id,
        old_monthly_deposit: fresh.old_monthly_deposit,
        new_monthly_deposit: fresh.new_monthly_deposit,
        completed_periods_at_upgrade: fresh.completed_periods,
        compensation_per_month: fresh.compensation_per_month,
        new_payment_with_compensation: fresh.new_payment_with_compensation,
        created_at: now,
    };

    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    product_upgrade::create(&mut *tx, &record).await?;
    member::apply_upgrade(&mut *tx, member.id, record.id, new_product.id).await?;
    tx.commit()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(
        member_id = member.id,
        old_product = old_product.id,
        new_product = new_product.id,
        compensation = record.compensation_per_month,
        "Product upgrade executed"
    );
    Ok(record)
}

/// GET /api/admin/product-upgrade/member/:member_id - 升级历史 (最新在前)
pub async fn history(
    State(state): State<ServerState>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<ProductUpgrade>>>> {
    require_member(&state.pool, member_id).await?;
    let upgrades = product_upgrade::find_by_member(&state.pool, member_id).await?;
    Ok(ok(upgrades))
}
