//! Product Upgrade Model

use serde::{Deserialize, Serialize};

/// Historical record of a member switching products mid-term
///
/// Immutable once created. `completed_periods_at_upgrade` counts the
/// periods fully paid under the old rate at the moment of upgrade;
/// `compensation_per_month` spreads the shortfall from those periods
/// over the remaining term. Invariant:
/// `new_payment_with_compensation = new_monthly_deposit + compensation_per_month`,
/// and compensation is positive only when the new deposit is higher and
/// at least one period was completed under the old rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ProductUpgrade {
    pub id: i64,
    pub member_id: i64,
    pub old_product_id: i64,
    pub new_product_id: i64,
    pub old_monthly_deposit: f64,
    pub new_monthly_deposit: f64,
    pub completed_periods_at_upgrade: i64,
    pub compensation_per_month: f64,
    pub new_payment_with_compensation: f64,
    pub created_at: i64,
}
