//! Installment-period reconciliation engine
//!
//! Pure business logic over already-validated data: given a member's
//! savings product, upgrade history, and a scattered set of
//! partial/rejected/approved payment records, determine
//!
//! - which installment period is next due,
//! - how much is still owed for a given period,
//! - how a mid-term product upgrade retroactively changes the required
//!   amount per period (old rate before the upgrade, new rate plus
//!   compensation after).
//!
//! All calculations are done using `Decimal` internally, then converted
//! to `f64` for storage/serialization. Everything here is read-only and
//! idempotent; handlers may recompute freely.

mod aggregator;
mod requirement;
mod suggester;
mod types;
mod upgrade;

pub use aggregator::{aggregate, group_by_period};
pub use requirement::required_amount;
pub use suggester::{
    actual_last_completed_period, count_completed_periods, incomplete_periods, suggest_next,
};
pub use types::{
    IncompletePeriod, NextPeriod, PeriodState, PeriodStatus, PeriodTransaction, TransactionBrief,
    UpgradeCalculation, UpgradeTerms,
};
pub use upgrade::{UpgradeError, calculate_upgrade};

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Convert f64 to Decimal for calculation
#[inline]
pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
