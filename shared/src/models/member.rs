//! Member Model

use serde::{Deserialize, Serialize};

/// Cooperative member (anggota koperasi)
///
/// `savings_start_date` anchors installment period 1 to a calendar month
/// and defaults to the creation timestamp. `is_completed` is a manual
/// "paid off" flag set by the admin, orthogonal to the period math.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Member {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub phone: Option<String>,
    /// Current savings product; None until the admin assigns one
    pub product_id: Option<i64>,
    pub has_upgraded: bool,
    /// Active ProductUpgrade record after a mid-term product switch
    pub current_upgrade_id: Option<i64>,
    pub savings_start_date: i64,
    pub is_completed: bool,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreate {
    pub name: String,
    pub phone: Option<String>,
    pub product_id: Option<i64>,
    pub savings_start_date: Option<i64>,
    pub notes: Option<String>,
}

/// Update member payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub product_id: Option<i64>,
    pub savings_start_date: Option<i64>,
    pub is_completed: Option<bool>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}
