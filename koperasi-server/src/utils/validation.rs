//! Input validation helpers
//!
//! Centralized text length constants and boundary checks. All validation
//! runs before any reconciliation logic touches the request.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: member, product
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, rejection reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Proof file paths
pub const MAX_PATH_LEN: usize = 1024;

// ── Money / period bounds ───────────────────────────────────────────

/// Maximum single payment amount (Rp 10 billion)
pub const MAX_AMOUNT: f64 = 10_000_000_000.0;

/// Maximum term length in periods
pub const MAX_TERM_DURATION: i64 = 600;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a monetary amount: finite, positive, within bounds.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    if value <= 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        )));
    }
    Ok(())
}

/// Validate an installment period: 1-based positive integer.
pub fn validate_period(period: i64) -> Result<(), AppError> {
    if period < 1 {
        return Err(AppError::validation(format!(
            "installmentPeriod must be >= 1, got {period}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Budi", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn rejects_non_finite_amount() {
        assert!(validate_amount(f64::NAN, "amount").is_err());
        assert!(validate_amount(f64::INFINITY, "amount").is_err());
        assert!(validate_amount(-5.0, "amount").is_err());
        assert!(validate_amount(0.0, "amount").is_err());
        assert!(validate_amount(100_000.0, "amount").is_ok());
    }

    #[test]
    fn rejects_zero_period() {
        assert!(validate_period(0).is_err());
        assert!(validate_period(-3).is_err());
        assert!(validate_period(1).is_ok());
    }
}
