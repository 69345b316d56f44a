//! Period Requirement Resolver
//!
//! Maps (period, upgrade state) to the amount required for that period.
//! This is the single source of truth the aggregator, suggester, and
//! payment submission all resolve against.

use super::types::UpgradeTerms;

/// Required contribution for installment period `period`.
///
/// - No upgrade: the product's deposit amount, for every period.
/// - Upgraded, `period <= completed_periods_at_upgrade`: the old monthly
///   deposit (those periods were already settled at the old rate).
/// - Upgraded, later periods: the new payment with compensation, falling
///   back to the product deposit if the stored value is unset.
///
/// When `completed_periods_at_upgrade == 0` the first branch can never
/// match (periods are 1-based), so every period uses the new rate — the
/// intended behavior for an upgrade executed before any period was
/// completed.
pub fn required_amount(period: i64, deposit_amount: f64, upgrade: Option<&UpgradeTerms>) -> f64 {
    let Some(up) = upgrade else {
        return deposit_amount;
    };

    if period <= up.completed_periods_at_upgrade && up.old_monthly_deposit > 0.0 {
        return up.old_monthly_deposit;
    }

    if up.new_payment_with_compensation > 0.0 {
        up.new_payment_with_compensation
    } else {
        deposit_amount
    }
}
