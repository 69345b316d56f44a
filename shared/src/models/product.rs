//! Savings Product Model

use serde::{Deserialize, Serialize};

/// Savings product (produk simpanan)
///
/// `deposit_amount` is the required contribution per installment period,
/// `term_duration` the total number of periods. The reconciliation engine
/// treats both as a snapshot at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub deposit_amount: f64,
    pub term_duration: i64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub deposit_amount: f64,
    pub term_duration: i64,
    pub description: Option<String>,
}

/// Update product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub deposit_amount: Option<f64>,
    pub term_duration: Option<i64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
