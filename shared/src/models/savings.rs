//! Savings Record Model
//!
//! One submitted installment transaction. Multiple records may share an
//! `installment_period` (partial installments accumulate toward one
//! period); only `Approved` records count toward a period's paid total.

use serde::{Deserialize, Serialize};

/// Record-level verification status
///
/// Distinct vocabulary from the period-level state the reconciliation
/// engine reports; do not conflate the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum SavingsStatus {
    Pending,
    Approved,
    Rejected,
    /// Legacy status used by some import flows; excluded from paid totals
    Partial,
}

/// Transaction direction: Setoran = deposit, Penarikan = withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum SavingsType {
    Setoran,
    Penarikan,
}

/// Full vs. partial installment, derived at submission time
/// (`amount < required` ⇒ Partial)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum PaymentType {
    Full,
    Partial,
}

/// Savings installment record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SavingsRecord {
    pub id: i64,
    pub member_id: i64,
    /// Product in effect at submission time; may differ from the member's
    /// current product after an upgrade
    pub product_id: i64,
    /// 1-based installment period this payment is for
    pub installment_period: i64,
    pub amount: f64,
    pub status: SavingsStatus,
    #[serde(rename = "type")]
    pub savings_type: SavingsType,
    pub payment_type: PaymentType,
    /// Ordinal among submissions for the same period
    pub partial_sequence: i64,
    /// Required when status = Rejected
    pub rejection_reason: Option<String>,
    /// Proof image path, attached by the upload collaborator
    pub proof_file: Option<String>,
    /// Upload date (millis)
    pub savings_date: i64,
    /// Actual transfer date, distinct from the upload date
    pub payment_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Submit payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsCreate {
    pub member_id: i64,
    pub product_id: i64,
    pub installment_period: i64,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub savings_type: Option<SavingsType>,
    pub proof_file: Option<String>,
    pub savings_date: Option<i64>,
    pub payment_date: Option<i64>,
}
