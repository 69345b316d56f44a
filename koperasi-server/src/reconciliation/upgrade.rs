//! Upgrade Compensation Calculator
//!
//! When a member switches to a higher-tier product mid-term, the periods
//! already paid at the lower rate leave a shortfall. That shortfall is
//! spread evenly over the remaining periods as `compensation_per_month`.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::UpgradeCalculation;
use super::{to_decimal, to_f64};
use crate::utils::AppError;

/// Calculation failures — all rejected before anything is persisted, so a
/// divide-by-zero can never leak NaN/Infinity into stored data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpgradeError {
    #[error("no remaining periods to amortize the shortfall over")]
    NoRemainingPeriods,

    #[error("invalid upgrade terms: {0}")]
    InvalidTerms(String),
}

impl From<UpgradeError> for AppError {
    fn from(err: UpgradeError) -> Self {
        match err {
            UpgradeError::NoRemainingPeriods => AppError::business_rule(err.to_string()),
            UpgradeError::InvalidTerms(_) => AppError::validation(err.to_string()),
        }
    }
}

/// Compute the compensation schedule for a product upgrade.
///
/// - `monthly_delta = new - old`; a cheaper or equal new product yields
///   zero shortfall and zero compensation (no retroactive refund).
/// - `total_shortfall = monthly_delta * completed_periods`.
/// - `compensation_per_month = total_shortfall / remaining_periods`,
///   rounded to 2 decimal places half-up.
///
/// `remaining_periods <= 0` is a domain error, not a division.
pub fn calculate_upgrade(
    old_deposit: f64,
    new_deposit: f64,
    completed_periods: i64,
    total_periods: i64,
) -> Result<UpgradeCalculation, UpgradeError> {
    if !old_deposit.is_finite() || old_deposit < 0.0 {
        return Err(UpgradeError::InvalidTerms(format!(
            "old deposit must be non-negative, got {old_deposit}"
        )));
    }
    if !new_deposit.is_finite() || new_deposit <= 0.0 {
        return Err(UpgradeError::InvalidTerms(format!(
            "new deposit must be positive, got {new_deposit}"
        )));
    }
    if completed_periods < 0 {
        return Err(UpgradeError::InvalidTerms(format!(
            "completed periods must be non-negative, got {completed_periods}"
        )));
    }
    if total_periods <= 0 {
        return Err(UpgradeError::InvalidTerms(format!(
            "total periods must be positive, got {total_periods}"
        )));
    }

    let remaining_periods = total_periods - completed_periods;
    if remaining_periods <= 0 {
        return Err(UpgradeError::NoRemainingPeriods);
    }

    let old = to_decimal(old_deposit);
    let new = to_decimal(new_deposit);
    let delta = new - old;

    // Shortfall only accrues when upgrading to a more expensive product
    // and at least one period was paid at the old rate
    let shortfall = if delta > Decimal::ZERO {
        delta * Decimal::from(completed_periods)
    } else {
        Decimal::ZERO
    };

    let compensation = if shortfall > Decimal::ZERO {
        shortfall / Decimal::from(remaining_periods)
    } else {
        Decimal::ZERO
    };

    Ok(UpgradeCalculation {
        old_monthly_deposit: to_f64(old),
        new_monthly_deposit: to_f64(new),
        completed_periods,
        total_periods,
        remaining_periods,
        monthly_delta: to_f64(delta),
        total_shortfall: to_f64(shortfall),
        compensation_per_month: to_f64(compensation),
        new_payment_with_compensation: to_f64(new + compensation),
    })
}
