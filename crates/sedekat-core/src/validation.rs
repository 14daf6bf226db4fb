//! # Validation Module
//!
//! Input validation for everything the admin and reseller screens submit.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dashboard form (TypeScript)                                            │
//! │  └── empty / length checks for immediate feedback                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ledger-api handler                                                     │
//! │  └── JSON deserialization (types)                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  THIS MODULE: business rules (quantities, costs, date ranges)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  SQLite: NOT NULL, UNIQUE, CHECK and foreign key constraints           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sedekat_core::validation::{validate_quantity, parse_date_range};
//!
//! validate_quantity(5).unwrap();
//! let range = parse_date_range(Some("2026-03-01"), Some("2026-03-31")).unwrap();
//! assert!(!range.is_all_time());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::period::DateRange;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Checks that a trimmed text field is present and not longer than `max`.
///
/// Returns the trimmed value.
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a customer name at checkout.
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    validate_text("customer_name", name, 100)
}

/// Validates a phone number.
///
/// ## Rules
/// - Digits, with an optional leading `+`
/// - Spaces and hyphens are stripped first
/// - 8 to 15 digits
///
/// ## Example
/// ```rust
/// use sedekat_core::validation::validate_phone;
///
/// assert_eq!(validate_phone("0812-3456-7890").unwrap(), "081234567890");
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let cleaned: String = phone
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits and an optional leading +".to_string(),
        });
    }

    if !(8..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 8 and 15 digits".to_string(),
        });
    }

    Ok(cleaned)
}

/// Validates that an identifier was supplied.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Normalizes an optional catalog token.
///
/// Blank tokens mean "no reseller" (a direct order), so they become `None`.
pub fn normalize_catalog_token(token: Option<&str>) -> ValidationResult<Option<String>> {
    match token.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) if t.len() > 64 => Err(ValidationError::TooLong {
            field: "catalog_token".to_string(),
            max: 64,
        }),
        Some(t) if !t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') => {
            Err(ValidationError::InvalidFormat {
                field: "catalog_token".to_string(),
                reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
            })
        }
        Some(t) => Ok(Some(t.to_string())),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the number of lines in one checkout.
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }
    Ok(())
}

/// Validates a reward cost (sen or points). A free reward would let a
/// reseller redeem with a zero balance.
pub fn validate_reward_cost(cost: i64) -> ValidationResult<()> {
    if cost <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "cost".to_string(),
        });
    }
    Ok(())
}

/// Validates a per-unit commission (sen) or points value on a product.
///
/// Zero is allowed: some products pay no commission.
pub fn validate_rate(field: &str, value: Option<i64>) -> ValidationResult<()> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected a date as YYYY-MM-DD".to_string(),
    })
}

/// Parses optional `start`/`end` query parameters into a [`DateRange`].
///
/// Missing bounds are open; both missing means all time.
pub fn parse_date_range(start: Option<&str>, end: Option<&str>) -> ValidationResult<DateRange> {
    let start = start
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_date("start", s))
        .transpose()?;
    let end = end
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_date("end", s))
        .transpose()?;

    DateRange::from_bounds(start, end)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text() {
        assert_eq!(validate_text("name", "  Sari  ", 10).unwrap(), "Sari");
        assert!(matches!(
            validate_text("name", "   ", 10),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_text("name", "abcdefghijk", 10),
            Err(ValidationError::TooLong { max: 10, .. })
        ));
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("+62 812 3456 7890").unwrap(), "+6281234567890");
        assert!(validate_phone("").is_err());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("0812abc4567").is_err());
    }

    #[test]
    fn test_normalize_catalog_token() {
        assert_eq!(normalize_catalog_token(None).unwrap(), None);
        assert_eq!(normalize_catalog_token(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_catalog_token(Some(" mitra-sari_01 ")).unwrap(),
            Some("mitra-sari_01".to_string())
        );
        assert!(normalize_catalog_token(Some("a/b")).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_reward_cost() {
        assert!(validate_reward_cost(1).is_ok());
        assert!(validate_reward_cost(0).is_err());
        assert!(validate_reward_cost(-100).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate("commission_value", None).is_ok());
        assert!(validate_rate("commission_value", Some(0)).is_ok());
        assert!(validate_rate("points_value", Some(-1)).is_err());
    }

    #[test]
    fn test_parse_date_range() {
        let range = parse_date_range(Some("2026-03-01"), Some("2026-03-31")).unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(range.end(), NaiveDate::from_ymd_opt(2026, 3, 31));

        assert!(parse_date_range(None, None).unwrap().is_all_time());
        assert!(parse_date_range(Some(""), None).unwrap().is_all_time());
    }

    #[test]
    fn test_parse_date_range_errors() {
        assert!(matches!(
            parse_date_range(Some("01/03/2026"), None),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_date_range(Some("2026-04-01"), Some("2026-03-01")),
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }
}
