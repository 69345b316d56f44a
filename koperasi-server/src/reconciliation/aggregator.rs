//! Period Aggregator
//!
//! Groups a member's payment records by installment period and derives
//! the per-period status table the MemberDetail and Reports views render
//! as-is.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::{SavingsRecord, SavingsStatus};

use super::requirement::required_amount;
use super::types::{PeriodState, PeriodStatus, PeriodTransaction, UpgradeTerms};
use super::{to_decimal, to_f64};

/// Pre-group records by period so aggregation is O(payments + periods).
pub fn group_by_period(records: &[SavingsRecord]) -> BTreeMap<i64, Vec<&SavingsRecord>> {
    let mut map: BTreeMap<i64, Vec<&SavingsRecord>> = BTreeMap::new();
    for record in records {
        map.entry(record.installment_period).or_default().push(record);
    }
    map
}

/// Sum of approved amounts in a period group.
///
/// Only `Approved` records count; Pending, Rejected, and the legacy
/// Partial status are excluded from paid totals.
pub(super) fn approved_total(group: &[&SavingsRecord]) -> Decimal {
    group
        .iter()
        .filter(|r| r.status == SavingsStatus::Approved)
        .map(|r| to_decimal(r.amount))
        .sum()
}

/// Period state from the most recently dated record plus the paid total.
///
/// A trailing rejection or pending submission overrides the arithmetic
/// state so the admin sees what still needs attention.
fn period_state(latest: Option<&SavingsRecord>, paid: Decimal, required: Decimal) -> PeriodState {
    match latest.map(|r| r.status) {
        Some(SavingsStatus::Rejected) => PeriodState::Rejected,
        Some(SavingsStatus::Pending) => PeriodState::Pending,
        _ => {
            if paid >= required && required > Decimal::ZERO {
                PeriodState::Paid
            } else if paid > Decimal::ZERO {
                PeriodState::Partial
            } else {
                PeriodState::BelumBayar
            }
        }
    }
}

/// Build the per-period status table for periods 1..=`total_periods`.
pub fn aggregate(
    records: &[SavingsRecord],
    deposit_amount: f64,
    upgrade: Option<&UpgradeTerms>,
    total_periods: i64,
) -> Vec<PeriodStatus> {
    let grouped = group_by_period(records);
    let empty: Vec<&SavingsRecord> = Vec::new();

    (1..=total_periods.max(0))
        .map(|period| {
            let group = grouped.get(&period).unwrap_or(&empty);

            let required = to_decimal(required_amount(period, deposit_amount, upgrade));
            let paid = approved_total(group);
            let remaining = (required - paid).max(Decimal::ZERO);

            // Most recently dated record decides pending/rejected overrides
            let latest = group
                .iter()
                .max_by_key(|r| (r.savings_date, r.created_at, r.id))
                .copied();
            let status = period_state(latest, paid, required);

            // Drill-down list, oldest first
            let mut ordered: Vec<&SavingsRecord> = group.clone();
            ordered.sort_by_key(|r| (r.savings_date, r.created_at, r.id));
            let transactions = ordered
                .into_iter()
                .map(|r| PeriodTransaction {
                    id: r.id,
                    amount: r.amount,
                    status: r.status,
                    payment_type: r.payment_type,
                    date: r.savings_date,
                    rejection_reason: r.rejection_reason.clone(),
                })
                .collect();

            PeriodStatus {
                period,
                required: to_f64(required),
                paid: to_f64(paid),
                remaining: to_f64(remaining),
                status,
                transactions,
            }
        })
        .collect()
}
