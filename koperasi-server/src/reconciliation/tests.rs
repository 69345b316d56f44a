use super::*;
use shared::models::{PaymentType, SavingsRecord, SavingsStatus, SavingsType};

fn record(
    id: i64,
    period: i64,
    amount: f64,
    status: SavingsStatus,
    savings_date: i64,
) -> SavingsRecord {
    SavingsRecord {
        id,
        member_id: 1,
        product_id: 10,
        installment_period: period,
        amount,
        status,
        savings_type: SavingsType::Setoran,
        payment_type: PaymentType::Full,
        partial_sequence: 1,
        rejection_reason: None,
        proof_file: None,
        savings_date,
        payment_date: None,
        created_at: savings_date,
        updated_at: savings_date,
    }
}

fn upgraded_terms() -> UpgradeTerms {
    // 100k -> 150k after 3 completed periods of a 12-period term:
    // shortfall 150_000 spread over 9 periods = 16_666.67/month
    UpgradeTerms {
        old_monthly_deposit: 100_000.0,
        new_monthly_deposit: 150_000.0,
        completed_periods_at_upgrade: 3,
        compensation_per_month: 16_666.67,
        new_payment_with_compensation: 166_666.67,
    }
}

// ── Requirement resolver ────────────────────────────────────────────

#[test]
fn resolver_constant_without_upgrade() {
    for period in 1..=36 {
        assert_eq!(required_amount(period, 2_000_000.0, None), 2_000_000.0);
    }
}

#[test]
fn resolver_splits_at_upgrade_boundary() {
    let up = upgraded_terms();
    for period in 1..=3 {
        assert_eq!(required_amount(period, 150_000.0, Some(&up)), 100_000.0);
    }
    for period in 4..=12 {
        assert_eq!(required_amount(period, 150_000.0, Some(&up)), 166_666.67);
    }
}

#[test]
fn resolver_uses_new_rate_for_all_periods_when_no_periods_completed() {
    // Upgrade before any period was completed: period <= 0 never matches,
    // so every period falls through to the with-compensation amount
    let up = UpgradeTerms {
        old_monthly_deposit: 100_000.0,
        new_monthly_deposit: 150_000.0,
        completed_periods_at_upgrade: 0,
        compensation_per_month: 0.0,
        new_payment_with_compensation: 150_000.0,
    };
    assert_eq!(required_amount(1, 150_000.0, Some(&up)), 150_000.0);
    assert_eq!(required_amount(12, 150_000.0, Some(&up)), 150_000.0);
}

#[test]
fn resolver_falls_back_to_product_deposit_when_compensation_unset() {
    let up = UpgradeTerms {
        old_monthly_deposit: 100_000.0,
        new_monthly_deposit: 150_000.0,
        completed_periods_at_upgrade: 3,
        compensation_per_month: 0.0,
        new_payment_with_compensation: 0.0,
    };
    assert_eq!(required_amount(5, 150_000.0, Some(&up)), 150_000.0);
}

// ── Compensation calculator ─────────────────────────────────────────

#[test]
fn compensation_arithmetic() {
    let calc = calculate_upgrade(100_000.0, 150_000.0, 3, 12).unwrap();
    assert_eq!(calc.monthly_delta, 50_000.0);
    assert_eq!(calc.total_shortfall, 150_000.0);
    assert_eq!(calc.remaining_periods, 9);
    assert_eq!(calc.compensation_per_month, 16_666.67);
    assert_eq!(calc.new_payment_with_compensation, 166_666.67);
}

#[test]
fn no_compensation_on_downgrade() {
    let calc = calculate_upgrade(150_000.0, 100_000.0, 5, 12).unwrap();
    assert_eq!(calc.total_shortfall, 0.0);
    assert_eq!(calc.compensation_per_month, 0.0);
    assert_eq!(calc.new_payment_with_compensation, 100_000.0);

    let equal = calculate_upgrade(150_000.0, 150_000.0, 5, 12).unwrap();
    assert_eq!(equal.compensation_per_month, 0.0);
}

#[test]
fn no_compensation_when_nothing_completed() {
    let calc = calculate_upgrade(100_000.0, 150_000.0, 0, 12).unwrap();
    assert_eq!(calc.total_shortfall, 0.0);
    assert_eq!(calc.compensation_per_month, 0.0);
    assert_eq!(calc.new_payment_with_compensation, 150_000.0);
}

#[test]
fn compensation_guards_exhausted_term() {
    assert_eq!(
        calculate_upgrade(100_000.0, 150_000.0, 12, 12),
        Err(UpgradeError::NoRemainingPeriods)
    );
    assert_eq!(
        calculate_upgrade(100_000.0, 150_000.0, 15, 12),
        Err(UpgradeError::NoRemainingPeriods)
    );
}

#[test]
fn compensation_rejects_bad_terms() {
    assert!(calculate_upgrade(f64::NAN, 150_000.0, 3, 12).is_err());
    assert!(calculate_upgrade(100_000.0, 0.0, 3, 12).is_err());
    assert!(calculate_upgrade(100_000.0, 150_000.0, -1, 12).is_err());
    assert!(calculate_upgrade(100_000.0, 150_000.0, 3, 0).is_err());
}

// ── Aggregator ──────────────────────────────────────────────────────

#[test]
fn partials_accumulate_to_paid() {
    // Required 2M for period 5; three approved partials cover it exactly
    let records = vec![
        record(1, 5, 500_000.0, SavingsStatus::Approved, 100),
        record(2, 5, 700_000.0, SavingsStatus::Approved, 200),
        record(3, 5, 800_000.0, SavingsStatus::Approved, 300),
    ];
    let statuses = aggregate(&records, 2_000_000.0, None, 12);
    let p5 = &statuses[4];
    assert_eq!(p5.period, 5);
    assert_eq!(p5.paid, 2_000_000.0);
    assert_eq!(p5.remaining, 0.0);
    assert_eq!(p5.status, PeriodState::Paid);
    assert_eq!(p5.transactions.len(), 3);
}

#[test]
fn partial_period_reports_remaining() {
    let records = vec![
        record(1, 5, 500_000.0, SavingsStatus::Approved, 100),
        record(2, 5, 700_000.0, SavingsStatus::Approved, 200),
    ];
    let statuses = aggregate(&records, 2_000_000.0, None, 12);
    let p5 = &statuses[4];
    assert_eq!(p5.paid, 1_200_000.0);
    assert_eq!(p5.remaining, 800_000.0);
    assert_eq!(p5.status, PeriodState::Partial);
}

#[test]
fn rejected_records_do_not_count_as_paid() {
    let records = vec![record(1, 7, 2_000_000.0, SavingsStatus::Rejected, 100)];
    let statuses = aggregate(&records, 2_000_000.0, None, 12);
    let p7 = &statuses[6];
    assert_eq!(p7.paid, 0.0);
    assert_eq!(p7.remaining, 2_000_000.0);
    // Latest record is the rejection, so the period shows as rejected
    assert_eq!(p7.status, PeriodState::Rejected);
    assert_ne!(p7.status, PeriodState::Paid);
}

#[test]
fn latest_pending_overrides_partial_state() {
    let records = vec![
        record(1, 2, 1_000_000.0, SavingsStatus::Approved, 100),
        record(2, 2, 1_000_000.0, SavingsStatus::Pending, 200),
    ];
    let statuses = aggregate(&records, 2_000_000.0, None, 12);
    assert_eq!(statuses[1].status, PeriodState::Pending);
    // Pending amount is not part of the paid total
    assert_eq!(statuses[1].paid, 1_000_000.0);
}

#[test]
fn resubmission_after_rejection_wins_by_date() {
    let records = vec![
        record(1, 3, 2_000_000.0, SavingsStatus::Rejected, 100),
        record(2, 3, 2_000_000.0, SavingsStatus::Approved, 200),
    ];
    let statuses = aggregate(&records, 2_000_000.0, None, 12);
    assert_eq!(statuses[2].status, PeriodState::Paid);
}

#[test]
fn untouched_periods_are_belum_bayar() {
    let records = vec![record(1, 1, 2_000_000.0, SavingsStatus::Approved, 100)];
    let statuses = aggregate(&records, 2_000_000.0, None, 3);
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0].status, PeriodState::Paid);
    assert_eq!(statuses[1].status, PeriodState::BelumBayar);
    assert_eq!(statuses[2].status, PeriodState::BelumBayar);
}

#[test]
fn aggregate_applies_upgrade_rates_per_period() {
    let up = upgraded_terms();
    let records = vec![
        record(1, 2, 100_000.0, SavingsStatus::Approved, 100),
        record(2, 4, 100_000.0, SavingsStatus::Approved, 200),
    ];
    let statuses = aggregate(&records, 150_000.0, Some(&up), 12);
    // Period 2: old rate fully covers it
    assert_eq!(statuses[1].required, 100_000.0);
    assert_eq!(statuses[1].status, PeriodState::Paid);
    // Period 4: new rate with compensation, 100k is only partial
    assert_eq!(statuses[3].required, 166_666.67);
    assert_eq!(statuses[3].status, PeriodState::Partial);
    assert_eq!(statuses[3].remaining, 66_666.67);
}

// ── Suggester ───────────────────────────────────────────────────────

#[test]
fn incomplete_period_beats_next_fresh_period() {
    // Period 3 underpaid, period 5 fully paid out of order
    let records = vec![
        record(1, 3, 1_000_000.0, SavingsStatus::Approved, 100),
        record(2, 5, 2_000_000.0, SavingsStatus::Approved, 200),
    ];
    let next = suggest_next(&records, 2_000_000.0, None);
    assert_eq!(next.period, 3);
    assert!(next.is_partial_continuation);
    assert_eq!(next.remaining_amount, 1_000_000.0);
    assert_eq!(next.suggested_amount, 1_000_000.0);
}

#[test]
fn fresh_member_starts_at_period_one() {
    let next = suggest_next(&[], 2_000_000.0, None);
    assert_eq!(next.period, 1);
    assert!(!next.is_partial_continuation);
    assert_eq!(next.suggested_amount, 2_000_000.0);
}

#[test]
fn advances_past_highest_completed_period() {
    let records = vec![
        record(1, 1, 2_000_000.0, SavingsStatus::Approved, 100),
        record(2, 2, 2_000_000.0, SavingsStatus::Approved, 200),
    ];
    let next = suggest_next(&records, 2_000_000.0, None);
    assert_eq!(next.period, 3);
    assert!(!next.is_partial_continuation);
}

#[test]
fn period_numbering_survives_product_switch() {
    // Periods 1-3 paid on the old product, then an upgrade: the next
    // suggested period is 4, not a reset to 1
    let up = upgraded_terms();
    let mut records = Vec::new();
    for (id, period) in [(1, 1), (2, 2), (3, 3)] {
        let mut r = record(id, period, 100_000.0, SavingsStatus::Approved, period * 100);
        r.product_id = 10; // old product
        records.push(r);
    }
    let next = suggest_next(&records, 150_000.0, Some(&up));
    assert_eq!(actual_last_completed_period(&records), 3);
    assert_eq!(next.period, 4);
    assert!(!next.is_partial_continuation);
    // Fresh post-upgrade period carries the compensation
    assert_eq!(next.suggested_amount, 166_666.67);
}

#[test]
fn pending_and_rejected_records_do_not_advance_periods() {
    let records = vec![
        record(1, 1, 2_000_000.0, SavingsStatus::Approved, 100),
        record(2, 2, 2_000_000.0, SavingsStatus::Pending, 200),
        record(3, 3, 2_000_000.0, SavingsStatus::Rejected, 300),
    ];
    assert_eq!(actual_last_completed_period(&records), 1);
    let next = suggest_next(&records, 2_000_000.0, None);
    assert_eq!(next.period, 2);
}

#[test]
fn withdrawals_do_not_advance_periods() {
    let mut withdrawal = record(2, 6, 500_000.0, SavingsStatus::Approved, 200);
    withdrawal.savings_type = SavingsType::Penarikan;
    let records = vec![
        record(1, 1, 2_000_000.0, SavingsStatus::Approved, 100),
        withdrawal,
    ];
    assert_eq!(actual_last_completed_period(&records), 1);
}

#[test]
fn incomplete_periods_sorted_ascending() {
    let records = vec![
        record(1, 8, 500_000.0, SavingsStatus::Approved, 100),
        record(2, 2, 500_000.0, SavingsStatus::Approved, 200),
        record(3, 5, 2_000_000.0, SavingsStatus::Approved, 300),
    ];
    let incompletes = incomplete_periods(&records, 2_000_000.0, None);
    let periods: Vec<i64> = incompletes.iter().map(|p| p.period).collect();
    assert_eq!(periods, vec![2, 8]);
    assert_eq!(incompletes[0].paid_amount, 500_000.0);
    assert_eq!(incompletes[0].remaining_amount, 1_500_000.0);
}

#[test]
fn count_completed_tracks_requirement_terms() {
    let records = vec![
        record(1, 1, 100_000.0, SavingsStatus::Approved, 100),
        record(2, 2, 100_000.0, SavingsStatus::Approved, 200),
        record(3, 3, 50_000.0, SavingsStatus::Approved, 300),
    ];
    assert_eq!(count_completed_periods(&records, 100_000.0, None), 2);
}

// ── Wire format ─────────────────────────────────────────────────────

#[test]
fn period_state_serializes_in_dashboard_vocabulary() {
    assert_eq!(
        serde_json::to_string(&PeriodState::BelumBayar).unwrap(),
        "\"belum_bayar\""
    );
    assert_eq!(
        serde_json::to_string(&PeriodState::Paid).unwrap(),
        "\"paid\""
    );
}

#[test]
fn upgrade_calculation_round_trips_as_camel_case() {
    let calc = calculate_upgrade(100_000.0, 150_000.0, 3, 12).unwrap();
    let json = serde_json::to_value(&calc).unwrap();
    assert_eq!(json["compensationPerMonth"], 16_666.67);
    assert_eq!(json["newPaymentWithCompensation"], 166_666.67);
    let back: UpgradeCalculation = serde_json::from_value(json).unwrap();
    assert_eq!(back, calc);
}

// ── Decimal boundary ────────────────────────────────────────────────

#[test]
fn decimal_sum_is_exact() {
    // 0.1 + 0.2 style drift must not leak into paid totals
    let records = vec![
        record(1, 1, 0.1, SavingsStatus::Approved, 100),
        record(2, 1, 0.2, SavingsStatus::Approved, 200),
    ];
    let statuses = aggregate(&records, 0.3, None, 1);
    assert_eq!(statuses[0].paid, 0.3);
    assert_eq!(statuses[0].status, PeriodState::Paid);
}
