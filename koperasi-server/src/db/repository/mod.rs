//! Repository Module
//!
//! Module-level CRUD functions per table, all taking `&SqlitePool`.

pub mod member;
pub mod product;
pub mod product_upgrade;
pub mod savings;

use crate::utils::AppError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Database(msg) => AppError::Database(msg),
            RepoError::Sqlx(e) => AppError::Database(e.to_string()),
        }
    }
}
