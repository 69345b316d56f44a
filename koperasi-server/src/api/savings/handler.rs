//! Savings API Handlers
//!
//! The check-period endpoint is the reconciliation engine's public face:
//! it bundles the next-period suggestion, incomplete periods, and the
//! member's transaction history into one response the payment form
//! consumes without further computation.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use shared::models::{
    Member, PaymentType, ProductUpgrade, SavingsCreate, SavingsRecord, SavingsStatus, SavingsType,
};

use crate::core::ServerState;
use crate::db::repository::{member, product, product_upgrade, savings};
use crate::reconciliation::{
    self, IncompletePeriod, PeriodStatus, TransactionBrief, UpgradeTerms,
};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_PATH_LEN, validate_amount, validate_optional_text, validate_period,
    validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// Upgrade summary embedded in the check-period response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeInfo {
    pub old_monthly_deposit: f64,
    pub new_monthly_deposit: f64,
    pub compensation_per_month: f64,
    pub new_payment_with_compensation: f64,
    pub completed_periods_at_upgrade: i64,
}

impl From<&ProductUpgrade> for UpgradeInfo {
    fn from(u: &ProductUpgrade) -> Self {
        Self {
            old_monthly_deposit: u.old_monthly_deposit,
            new_monthly_deposit: u.new_monthly_deposit,
            compensation_per_month: u.compensation_per_month,
            new_payment_with_compensation: u.new_payment_with_compensation,
            completed_periods_at_upgrade: u.completed_periods_at_upgrade,
        }
    }
}

/// Payload of `GET /check-period/:memberId/:productId`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPeriodData {
    pub last_period: i64,
    pub next_period: i64,
    pub is_partial_payment: bool,
    pub remaining_amount: f64,
    pub deposit_amount: f64,
    pub expected_amount: f64,
    pub has_upgrade: bool,
    pub upgrade_info: Option<UpgradeInfo>,
    pub incomplete_periods: Vec<IncompletePeriod>,
    pub pending_transactions: Vec<SavingsRecord>,
    pub rejected_transactions: Vec<SavingsRecord>,
    pub transactions_by_period: BTreeMap<i64, Vec<TransactionBrief>>,
}

/// Resolve a member or fail with 404; inactive members are treated as
/// missing so stale dashboard tabs cannot keep submitting for them.
async fn require_member(pool: &SqlitePool, member_id: i64) -> AppResult<Member> {
    let member = member::find_by_id(pool, member_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {member_id}")))?;
    if !member.is_active {
        return Err(AppError::not_found(format!("Member {member_id}")));
    }
    Ok(member)
}

/// The member's active upgrade terms, if any
async fn load_upgrade_terms(
    pool: &SqlitePool,
    member: &Member,
) -> AppResult<Option<ProductUpgrade>> {
    Ok(product_upgrade::find_active_for_member(pool, member).await?)
}

/// Assemble the check-period payload.
///
/// Pure orchestration over the reconciliation engine; exposed for
/// integration tests.
pub async fn build_check_period(
    pool: &SqlitePool,
    member_id: i64,
    product_id: i64,
) -> AppResult<CheckPeriodData> {
    let member = require_member(pool, member_id).await?;

    // The engine must never run against a defaulted product
    let product = product::find_by_id(pool, product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;

    let records = savings::find_by_member(pool, member_id).await?;
    let upgrade = load_upgrade_terms(pool, &member).await?;
    let terms = upgrade.as_ref().map(UpgradeTerms::from);

    let next = reconciliation::suggest_next(&records, product.deposit_amount, terms.as_ref());
    let incomplete =
        reconciliation::incomplete_periods(&records, product.deposit_amount, terms.as_ref());
    let last_period = reconciliation::actual_last_completed_period(&records);

    let pending: Vec<SavingsRecord> = records
        .iter()
        .filter(|r| r.status == SavingsStatus::Pending)
        .cloned()
        .collect();
    let rejected: Vec<SavingsRecord> = records
        .iter()
        .filter(|r| r.status == SavingsStatus::Rejected)
        .cloned()
        .collect();

    let mut transactions_by_period: BTreeMap<i64, Vec<TransactionBrief>> = BTreeMap::new();
    for (period, group) in reconciliation::group_by_period(&records) {
        let mut ordered = group;
        ordered.sort_by_key(|r| (r.savings_date, r.created_at, r.id));
        transactions_by_period.insert(
            period,
            ordered
                .into_iter()
                .map(|r| TransactionBrief {
                    amount: r.amount,
                    status: r.status,
                    date: r.savings_date,
                    rejection_reason: r.rejection_reason.clone(),
                })
                .collect(),
        );
    }

    Ok(CheckPeriodData {
        last_period,
        next_period: next.period,
        is_partial_payment: next.is_partial_continuation,
        remaining_amount: next.remaining_amount,
        deposit_amount: product.deposit_amount,
        expected_amount: next.suggested_amount,
        has_upgrade: upgrade.is_some(),
        upgrade_info: upgrade.as_ref().map(UpgradeInfo::from),
        incomplete_periods: incomplete,
        pending_transactions: pending,
        rejected_transactions: rejected,
        transactions_by_period,
    })
}

/// GET /api/admin/savings/check-period/:member_id/:product_id - 下期建议
pub async fn check_period(
    State(state): State<ServerState>,
    Path((member_id, product_id)): Path<(i64, i64)>,
) -> AppResult<Json<AppResponse<CheckPeriodData>>> {
    let data = build_check_period(&state.pool, member_id, product_id).await?;
    Ok(ok(data))
}

/// GET /api/admin/savings/period-status/:member_id - 每期状态表
///
/// Computed once here; MemberDetail and Reports render it as-is.
pub async fn period_status(
    State(state): State<ServerState>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<PeriodStatus>>>> {
    let member = require_member(&state.pool, member_id).await?;
    let product_id = member
        .product_id
        .ok_or_else(|| AppError::validation("Member has no savings product assigned"))?;
    let product = product::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;

    let records = savings::find_by_member(&state.pool, member_id).await?;
    let upgrade = load_upgrade_terms(&state.pool, &member).await?;
    let terms = upgrade.as_ref().map(UpgradeTerms::from);

    let statuses = reconciliation::aggregate(
        &records,
        product.deposit_amount,
        terms.as_ref(),
        product.term_duration,
    );
    Ok(ok(statuses))
}

/// GET /api/admin/savings/member/:member_id - 会员全部付款记录
pub async fn list_by_member(
    State(state): State<ServerState>,
    Path(member_id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<SavingsRecord>>>> {
    require_member(&state.pool, member_id).await?;
    let records = savings::find_by_member(&state.pool, member_id).await?;
    Ok(ok(records))
}

/// Submit a payment record. Serialized per member against upgrade
/// execution so the required amount is never derived from stale upgrade
/// state. Exposed for integration tests.
pub async fn submit_payment(
    state: &ServerState,
    payload: SavingsCreate,
) -> AppResult<SavingsRecord> {
    validate_period(payload.installment_period)?;
    validate_amount(payload.amount, "amount")?;
    validate_optional_text(&payload.proof_file, "proofFile", MAX_PATH_LEN)?;

    let member = require_member(&state.pool, payload.member_id).await?;
    let product = product::find_by_id(&state.pool, payload.product_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", payload.product_id)))?;

    let savings_type = payload.savings_type.unwrap_or(SavingsType::Setoran);

    // Per-member guard: see §upgrade execution
    let lock = state.member_lock(member.id);
    let _guard = lock.lock().await;

    if savings_type == SavingsType::Setoran
        && savings::has_pending_for_period(&state.pool, member.id, payload.installment_period)
            .await?
    {
        return Err(AppError::conflict(format!(
            "A pending payment for period {} already exists",
            payload.installment_period
        )));
    }

    let upgrade = load_upgrade_terms(&state.pool, &member).await?;
    let terms = upgrade.as_ref().map(UpgradeTerms::from);
    let required = reconciliation::required_amount(
        payload.installment_period,
        product.deposit_amount,
        terms.as_ref(),
    );

    // amount < required ⇒ partial installment
    let payment_type = if reconciliation::to_decimal(payload.amount)
        < reconciliation::to_decimal(required)
    {
        PaymentType::Partial
    } else {
        PaymentType::Full
    };

    let sequence =
        savings::count_for_period(&state.pool, member.id, payload.installment_period).await? + 1;

    let now = shared::util::now_millis();
    let record = SavingsRecord {
        id: shared::util::snowflake_id(),
        member_id: member.id,
        product_id: product.id,
        installment_period: payload.installment_period,
        amount: payload.amount,
        status: SavingsStatus::Pending,
        savings_type,
        payment_type,
        partial_sequence: sequence,
        rejection_reason: None,
        proof_file: payload.proof_file,
        savings_date: payload.savings_date.unwrap_or(now),
        payment_date: payload.payment_date,
        created_at: now,
        updated_at: now,
    };

    let created = savings::create(&state.pool, &record).await?;
    tracing::info!(
        member_id = member.id,
        period = created.installment_period,
        amount = created.amount,
        payment_type = ?created.payment_type,
        "Savings payment submitted"
    );
    Ok(created)
}

/// POST /api/admin/savings - 提交付款
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SavingsCreate>,
) -> AppResult<Json<AppResponse<SavingsRecord>>> {
    let record = submit_payment(&state, payload).await?;
    Ok(ok(record))
}

/// POST /api/admin/savings/:id/approve - 审核通过
pub async fn approve(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<SavingsRecord>>> {
    let record = savings::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Savings record {id}")))?;
    if record.status != SavingsStatus::Pending {
        return Err(AppError::conflict(format!(
            "Savings record {id} is not pending verification"
        )));
    }
    let updated = savings::update_status(&state.pool, id, SavingsStatus::Approved, None).await?;
    tracing::info!(record_id = id, member_id = record.member_id, "Payment approved");
    Ok(ok(updated))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectPayload {
    pub rejection_reason: String,
}

/// POST /api/admin/savings/:id/reject - 审核拒绝 (必须给出理由)
pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RejectPayload>,
) -> AppResult<Json<AppResponse<SavingsRecord>>> {
    validate_required_text(&payload.rejection_reason, "rejectionReason", MAX_NOTE_LEN)?;

    let record = savings::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Savings record {id}")))?;
    if record.status != SavingsStatus::Pending {
        return Err(AppError::conflict(format!(
            "Savings record {id} is not pending verification"
        )));
    }
    let updated = savings::update_status(
        &state.pool,
        id,
        SavingsStatus::Rejected,
        Some(&payload.rejection_reason),
    )
    .await?;
    tracing::info!(record_id = id, member_id = record.member_id, "Payment rejected");
    Ok(ok(updated))
}
