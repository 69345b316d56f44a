//! Domain models (会员/储蓄产品/分期记录/产品升级)
//!
//! All models serialize in camelCase to match the admin dashboard wire
//! format. Database derives (`sqlx::FromRow`, `sqlx::Type`) are gated
//! behind the `db` feature so client crates stay lean.

pub mod member;
pub mod product;
pub mod product_upgrade;
pub mod savings;

pub use member::{Member, MemberCreate, MemberUpdate};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use product_upgrade::ProductUpgrade;
pub use savings::{PaymentType, SavingsCreate, SavingsRecord, SavingsStatus, SavingsType};
