//! Shared types for the koperasi savings platform
//!
//! Domain models and utility types used by the server and any future
//! client crates: members, savings products, installment records,
//! product upgrades, and the enums describing their states.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
