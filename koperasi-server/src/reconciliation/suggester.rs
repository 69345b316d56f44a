//! Next-Period Suggester
//!
//! Scans a member's approved payments to decide which period to nudge the
//! admin toward next. Incomplete periods always win over advancing to a
//! fresh one; the UI still allows manual period selection, so this is a
//! suggestion, not an enforcement.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::{SavingsRecord, SavingsStatus, SavingsType};

use super::aggregator::approved_total;
use super::requirement::required_amount;
use super::types::{IncompletePeriod, NextPeriod, UpgradeTerms};
use super::{aggregator::group_by_period, to_decimal, to_f64};

/// Approved totals per period, for periods that have at least one
/// approved payment.
fn approved_totals(records: &[SavingsRecord]) -> BTreeMap<i64, Decimal> {
    group_by_period(records)
        .into_iter()
        .filter_map(|(period, group)| {
            let has_approved = group.iter().any(|r| r.status == SavingsStatus::Approved);
            has_approved.then(|| (period, approved_total(&group)))
        })
        .collect()
}

/// Highest installment period among all approved deposits, regardless of
/// which product was active at the time — a mid-term product switch must
/// not reset period numbering. Returns 0 when the member has no approved
/// deposits yet.
pub fn actual_last_completed_period(records: &[SavingsRecord]) -> i64 {
    records
        .iter()
        .filter(|r| r.status == SavingsStatus::Approved && r.savings_type == SavingsType::Setoran)
        .map(|r| r.installment_period)
        .max()
        .unwrap_or(0)
}

/// Periods whose approved total falls short of their requirement,
/// ascending by period number.
pub fn incomplete_periods(
    records: &[SavingsRecord],
    deposit_amount: f64,
    upgrade: Option<&UpgradeTerms>,
) -> Vec<IncompletePeriod> {
    approved_totals(records)
        .into_iter()
        .filter_map(|(period, paid)| {
            let required = to_decimal(required_amount(period, deposit_amount, upgrade));
            (paid < required).then(|| IncompletePeriod {
                period,
                paid_amount: to_f64(paid),
                remaining_amount: to_f64(required - paid),
            })
        })
        .collect()
}

/// Number of periods fully settled under the current requirement terms.
///
/// Used to derive `completed_periods_at_upgrade` when an upgrade is
/// calculated from database state.
pub fn count_completed_periods(
    records: &[SavingsRecord],
    deposit_amount: f64,
    upgrade: Option<&UpgradeTerms>,
) -> i64 {
    approved_totals(records)
        .into_iter()
        .filter(|(period, paid)| {
            let required = to_decimal(required_amount(*period, deposit_amount, upgrade));
            *paid >= required
        })
        .count() as i64
}

/// Suggest the next period requiring payment.
///
/// 1. Any period with approved payments below its requirement is
///    suggested first (lowest period number wins) as a partial
///    continuation, with the outstanding balance as the amount.
/// 2. Otherwise advance one past the highest approved period (or start
///    at 1), with the full requirement — which may include upgrade
///    compensation — as the amount.
pub fn suggest_next(
    records: &[SavingsRecord],
    deposit_amount: f64,
    upgrade: Option<&UpgradeTerms>,
) -> NextPeriod {
    let incompletes = incomplete_periods(records, deposit_amount, upgrade);

    if let Some(first) = incompletes.first() {
        tracing::debug!(
            period = first.period,
            remaining = first.remaining_amount,
            "suggesting continuation of incomplete period"
        );
        return NextPeriod {
            period: first.period,
            is_partial_continuation: true,
            suggested_amount: first.remaining_amount,
            remaining_amount: first.remaining_amount,
        };
    }

    let last = actual_last_completed_period(records);
    let next = last + 1;
    let required = required_amount(next, deposit_amount, upgrade);
    tracing::debug!(period = next, required, "suggesting fresh period");
    NextPeriod {
        period: next,
        is_partial_continuation: false,
        suggested_amount: required,
        remaining_amount: required,
    }
}
