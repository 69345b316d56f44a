//! Engine output types
//!
//! Period-level state uses a different vocabulary than record-level
//! [`SavingsStatus`](shared::models::SavingsStatus); the two are never
//! conflated.

use serde::{Deserialize, Serialize};
use shared::models::{PaymentType, ProductUpgrade, SavingsStatus};

/// Period-level payment state, serialized in the dashboard's lowercase
/// vocabulary (`belum_bayar` = not yet paid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodState {
    BelumBayar,
    Partial,
    Pending,
    Rejected,
    Paid,
}

/// Upgrade terms the requirement resolver needs, snapshotted from the
/// member's active [`ProductUpgrade`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeTerms {
    pub old_monthly_deposit: f64,
    pub new_monthly_deposit: f64,
    pub completed_periods_at_upgrade: i64,
    pub compensation_per_month: f64,
    pub new_payment_with_compensation: f64,
}

impl From<&ProductUpgrade> for UpgradeTerms {
    fn from(u: &ProductUpgrade) -> Self {
        Self {
            old_monthly_deposit: u.old_monthly_deposit,
            new_monthly_deposit: u.new_monthly_deposit,
            completed_periods_at_upgrade: u.completed_periods_at_upgrade,
            compensation_per_month: u.compensation_per_month,
            new_payment_with_compensation: u.new_payment_with_compensation,
        }
    }
}

/// One record inside a period's drill-down list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTransaction {
    pub id: i64,
    pub amount: f64,
    pub status: SavingsStatus,
    pub payment_type: PaymentType,
    pub date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Compact transaction view for the check-period `transactionsByPeriod` map
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBrief {
    pub amount: f64,
    pub status: SavingsStatus,
    pub date: i64,
    pub rejection_reason: Option<String>,
}

/// Aggregated view of one installment period
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatus {
    pub period: i64,
    pub required: f64,
    pub paid: f64,
    pub remaining: f64,
    pub status: PeriodState,
    pub transactions: Vec<PeriodTransaction>,
}

/// A period that has approved payments summing to less than its requirement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompletePeriod {
    pub period: i64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
}

/// The suggester's verdict: which period to pay next and how much
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPeriod {
    pub period: i64,
    pub is_partial_continuation: bool,
    pub suggested_amount: f64,
    pub remaining_amount: f64,
}

/// Result of an upgrade compensation calculation
///
/// Returned by the calculate endpoint and echoed back by the UI on
/// execute, where the server re-validates it against current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeCalculation {
    pub old_monthly_deposit: f64,
    pub new_monthly_deposit: f64,
    pub completed_periods: i64,
    pub total_periods: i64,
    pub remaining_periods: i64,
    pub monthly_delta: f64,
    pub total_shortfall: f64,
    pub compensation_per_month: f64,
    pub new_payment_with_compensation: f64,
}
