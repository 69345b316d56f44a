//! 端到端对账流程测试
//!
//! 使用 ServerState::initialize + 临时目录完整初始化（含数据库迁移），
//! 通过 repository 和 handler 辅助函数驱动完整业务流程：
//! 提交付款 → 审核 → check-period → 产品升级 → 升级后对账。

use koperasi_server::api::product_upgrade::handler::{ExecutePayload, execute_upgrade};
use koperasi_server::api::savings::handler::{build_check_period, submit_payment};
use koperasi_server::db::repository::{member, product, savings};
use koperasi_server::utils::AppError;
use koperasi_server::{Config, ServerState, reconciliation};
use shared::models::{
    Member, MemberCreate, PaymentType, Product, ProductCreate, SavingsCreate, SavingsStatus,
};
use tempfile::TempDir;

/// 初始化测试状态（TempDir 必须活到测试结束，否则数据库文件被删）
async fn test_state() -> (ServerState, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config)
        .await
        .expect("initialize server state");
    (state, dir)
}

async fn seed_product(state: &ServerState, name: &str, deposit: f64, term: i64) -> Product {
    product::create(
        &state.pool,
        ProductCreate {
            name: name.to_string(),
            deposit_amount: deposit,
            term_duration: term,
            description: None,
        },
    )
    .await
    .expect("create product")
}

async fn seed_member(state: &ServerState, name: &str, product_id: i64) -> Member {
    member::create(
        &state.pool,
        MemberCreate {
            name: name.to_string(),
            phone: None,
            product_id: Some(product_id),
            savings_start_date: None,
            notes: None,
        },
    )
    .await
    .expect("create member")
}

fn deposit_payload(
    member_id: i64,
    product_id: i64,
    period: i64,
    amount: f64,
    date: i64,
) -> SavingsCreate {
    SavingsCreate {
        member_id,
        product_id,
        installment_period: period,
        amount,
        savings_type: None,
        proof_file: None,
        savings_date: Some(date),
        payment_date: None,
    }
}

/// 提交并立刻审核通过一笔付款
async fn pay_approved(state: &ServerState, m: &Member, p: &Product, period: i64, amount: f64) {
    let date = period * 1_000;
    let record = submit_payment(state, deposit_payload(m.id, p.id, period, amount, date))
        .await
        .expect("submit payment");
    savings::update_status(&state.pool, record.id, SavingsStatus::Approved, None)
        .await
        .expect("approve payment");
}

#[tokio::test]
async fn full_payment_advances_next_period() {
    let (state, _dir) = test_state().await;
    let product = seed_product(&state, "Simpanan Reguler", 100_000.0, 12).await;
    let member = seed_member(&state, "Budi", product.id).await;

    let record = submit_payment(
        &state,
        deposit_payload(member.id, product.id, 1, 100_000.0, 1_000),
    )
    .await
    .expect("submit");
    assert_eq!(record.status, SavingsStatus::Pending);
    assert_eq!(record.payment_type, PaymentType::Full);
    assert_eq!(record.partial_sequence, 1);

    // Pending 不推进期数
    let check = build_check_period(&state.pool, member.id, product.id)
        .await
        .expect("check period");
    assert_eq!(check.last_period, 0);
    assert_eq!(check.next_period, 1);
    assert_eq!(check.pending_transactions.len(), 1);

    savings::update_status(&state.pool, record.id, SavingsStatus::Approved, None)
        .await
        .expect("approve");

    let check = build_check_period(&state.pool, member.id, product.id)
        .await
        .expect("check period");
    assert_eq!(check.last_period, 1);
    assert_eq!(check.next_period, 2);
    assert!(!check.is_partial_payment);
    assert_eq!(check.expected_amount, 100_000.0);
    assert!(check.incomplete_periods.is_empty());
}

#[tokio::test]
async fn duplicate_pending_deposit_is_rejected() {
    let (state, _dir) = test_state().await;
    let product = seed_product(&state, "Simpanan Reguler", 100_000.0, 12).await;
    let member = seed_member(&state, "Siti", product.id).await;

    submit_payment(
        &state,
        deposit_payload(member.id, product.id, 1, 100_000.0, 1_000),
    )
    .await
    .expect("first submit");

    let err = submit_payment(
        &state,
        deposit_payload(member.id, product.id, 1, 100_000.0, 2_000),
    )
    .await
    .expect_err("second pending deposit for the same period must fail");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn partial_payment_suggests_continuation() {
    let (state, _dir) = test_state().await;
    let product = seed_product(&state, "Simpanan Reguler", 100_000.0, 12).await;
    let member = seed_member(&state, "Agus", product.id).await;

    let record = submit_payment(
        &state,
        deposit_payload(member.id, product.id, 1, 60_000.0, 1_000),
    )
    .await
    .expect("submit partial");
    assert_eq!(record.payment_type, PaymentType::Partial);
    savings::update_status(&state.pool, record.id, SavingsStatus::Approved, None)
        .await
        .expect("approve");

    let check = build_check_period(&state.pool, member.id, product.id)
        .await
        .expect("check period");
    assert_eq!(check.next_period, 1);
    assert!(check.is_partial_payment);
    assert_eq!(check.remaining_amount, 40_000.0);
    assert_eq!(check.expected_amount, 40_000.0);
    assert_eq!(check.incomplete_periods.len(), 1);
    assert_eq!(check.incomplete_periods[0].paid_amount, 60_000.0);
}

#[tokio::test]
async fn rejected_payment_can_be_resubmitted() {
    let (state, _dir) = test_state().await;
    let product = seed_product(&state, "Simpanan Reguler", 100_000.0, 12).await;
    let member = seed_member(&state, "Dewi", product.id).await;

    let first = submit_payment(
        &state,
        deposit_payload(member.id, product.id, 1, 100_000.0, 1_000),
    )
    .await
    .expect("submit");
    savings::update_status(
        &state.pool,
        first.id,
        SavingsStatus::Rejected,
        Some("Bukti transfer tidak terbaca"),
    )
    .await
    .expect("reject");

    // 拒绝后期数不推进，且同期可以重新提交
    let check = build_check_period(&state.pool, member.id, product.id)
        .await
        .expect("check period");
    assert_eq!(check.next_period, 1);
    assert_eq!(check.rejected_transactions.len(), 1);

    let second = submit_payment(
        &state,
        deposit_payload(member.id, product.id, 1, 100_000.0, 2_000),
    )
    .await
    .expect("resubmit after rejection");
    assert_eq!(second.partial_sequence, 2);
}

#[tokio::test]
async fn upgrade_execute_and_post_upgrade_requirements() {
    let (state, _dir) = test_state().await;
    let product_a = seed_product(&state, "Simpanan Reguler", 100_000.0, 12).await;
    let product_b = seed_product(&state, "Simpanan Plus", 150_000.0, 12).await;
    let member = seed_member(&state, "Rina", product_a.id).await;

    for period in 1..=3 {
        pay_approved(&state, &member, &product_a, period, 100_000.0).await;
    }

    // 预览结果与 execute 时服务端重算结果一致
    let calc = reconciliation::calculate_upgrade(
        product_a.deposit_amount,
        product_b.deposit_amount,
        3,
        product_b.term_duration,
    )
    .expect("calculate upgrade");
    assert_eq!(calc.compensation_per_month, 16_666.67);
    assert_eq!(calc.new_payment_with_compensation, 166_666.67);

    let record = execute_upgrade(
        &state,
        ExecutePayload {
            member_id: member.id,
            new_product_id: product_b.id,
            calculation: calc.clone(),
        },
    )
    .await
    .expect("execute upgrade");
    assert_eq!(record.completed_periods_at_upgrade, 3);

    let updated = member::find_by_id(&state.pool, member.id)
        .await
        .expect("reload member")
        .expect("member exists");
    assert!(updated.has_upgraded);
    assert_eq!(updated.product_id, Some(product_b.id));
    assert_eq!(updated.current_upgrade_id, Some(record.id));

    // 升级前的期数按旧费率仍算已完成；下一期带补偿
    let check = build_check_period(&state.pool, member.id, product_b.id)
        .await
        .expect("check period after upgrade");
    assert_eq!(check.last_period, 3);
    assert_eq!(check.next_period, 4);
    assert!(!check.is_partial_payment);
    assert_eq!(check.expected_amount, 166_666.67);
    assert!(check.has_upgrade);
    assert!(check.incomplete_periods.is_empty());

    // 升到同一产品被拒
    let err = execute_upgrade(
        &state,
        ExecutePayload {
            member_id: member.id,
            new_product_id: product_b.id,
            calculation: calc,
        },
    )
    .await
    .expect_err("upgrading to the current product must fail");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn stale_upgrade_calculation_is_rejected() {
    let (state, _dir) = test_state().await;
    let product_a = seed_product(&state, "Simpanan Reguler", 100_000.0, 12).await;
    let product_b = seed_product(&state, "Simpanan Plus", 150_000.0, 12).await;
    let member = seed_member(&state, "Joko", product_a.id).await;

    for period in 1..=3 {
        pay_approved(&state, &member, &product_a, period, 100_000.0).await;
    }

    // 客户端在计算后又有一期被审核通过：回显的 completedPeriods 过期
    let calc = reconciliation::calculate_upgrade(
        product_a.deposit_amount,
        product_b.deposit_amount,
        3,
        product_b.term_duration,
    )
    .expect("calculate upgrade");
    pay_approved(&state, &member, &product_a, 4, 100_000.0).await;

    let err = execute_upgrade(
        &state,
        ExecutePayload {
            member_id: member.id,
            new_product_id: product_b.id,
            calculation: calc,
        },
    )
    .await
    .expect_err("stale calculation must be rejected");
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    // 升级未落库
    let reloaded = member::find_by_id(&state.pool, member.id)
        .await
        .expect("reload member")
        .expect("member exists");
    assert!(!reloaded.has_upgraded);
    assert_eq!(reloaded.product_id, Some(product_a.id));
}

#[tokio::test]
async fn invalid_submissions_are_validated() {
    let (state, _dir) = test_state().await;
    let product = seed_product(&state, "Simpanan Reguler", 100_000.0, 12).await;
    let member = seed_member(&state, "Tono", product.id).await;

    let err = submit_payment(
        &state,
        deposit_payload(member.id, product.id, 0, 100_000.0, 1_000),
    )
    .await
    .expect_err("period 0 must fail");
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    let err = submit_payment(
        &state,
        deposit_payload(member.id, product.id, 1, -5.0, 1_000),
    )
    .await
    .expect_err("negative amount must fail");
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    let err = submit_payment(
        &state,
        deposit_payload(member.id, 424242, 1, 100_000.0, 1_000),
    )
    .await
    .expect_err("unknown product must fail");
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}
