//! Field validation shared by model drafts, records and patches.
//!
//! # Invariants
//! - Validation never inspects storage; it only checks value shape.
//! - Error values never carry personal field contents.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

const MAX_COMMISSION_PCT: i64 = 100;

/// Validation failure for one model value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Text field is present but blank after trim.
    BlankField(&'static str),
    /// Email is present but not shaped like `local@domain.tld`.
    InvalidEmail,
    /// Monetary or percentage field is below zero.
    NegativeAmount { field: &'static str, value: i64 },
    /// Commission percentage is above 100.
    CommissionOutOfRange(i64),
    /// Job salary band has `min_salary > max_salary`.
    InvertedSalaryRange { min: i64, max: i64 },
    /// History record would close before it started.
    InvertedHistoryInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::InvalidEmail => write!(f, "email is not a valid address"),
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} must be >= 0, got {value}")
            }
            Self::CommissionOutOfRange(value) => write!(
                f,
                "commission_pct must be <= {MAX_COMMISSION_PCT}, got {value}"
            ),
            Self::InvertedSalaryRange { min, max } => {
                write!(f, "max_salary ({max}) must be >= min_salary ({min})")
            }
            Self::InvertedHistoryInterval { start, end } => write!(
                f,
                "history end_date ({}) must be >= start_date ({})",
                end.to_rfc3339(),
                start.to_rfc3339()
            ),
        }
    }
}

impl Error for ModelValidationError {}

/// Rejects present-but-blank text values.
pub fn check_not_blank(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ModelValidationError> {
    match value {
        Some(text) if text.trim().is_empty() => Err(ModelValidationError::BlankField(field)),
        _ => Ok(()),
    }
}

/// Rejects present email values that do not look like an address.
pub fn check_email(value: Option<&str>) -> Result<(), ModelValidationError> {
    match value {
        Some(email) if !EMAIL_RE.is_match(email.trim()) => Err(ModelValidationError::InvalidEmail),
        _ => Ok(()),
    }
}

/// Rejects negative amounts.
pub fn check_non_negative(
    field: &'static str,
    value: Option<i64>,
) -> Result<(), ModelValidationError> {
    match value {
        Some(amount) if amount < 0 => Err(ModelValidationError::NegativeAmount {
            field,
            value: amount,
        }),
        _ => Ok(()),
    }
}

/// Rejects commission percentages outside `0..=100`.
pub fn check_commission(value: Option<i64>) -> Result<(), ModelValidationError> {
    check_non_negative("commission_pct", value)?;
    match value {
        Some(pct) if pct > MAX_COMMISSION_PCT => {
            Err(ModelValidationError::CommissionOutOfRange(pct))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{check_commission, check_email, check_not_blank, ModelValidationError};

    #[test]
    fn email_check_accepts_plain_addresses_and_absence() {
        assert!(check_email(Some("ada@example.com")).is_ok());
        assert!(check_email(None).is_ok());
        assert_eq!(
            check_email(Some("not-an-address")),
            Err(ModelValidationError::InvalidEmail)
        );
    }

    #[test]
    fn blank_check_only_rejects_present_blank_values() {
        assert!(check_not_blank("first_name", None).is_ok());
        assert_eq!(
            check_not_blank("first_name", Some("  ")),
            Err(ModelValidationError::BlankField("first_name"))
        );
    }

    #[test]
    fn commission_must_be_a_percentage() {
        assert!(check_commission(Some(0)).is_ok());
        assert!(check_commission(Some(100)).is_ok());
        assert_eq!(
            check_commission(Some(101)),
            Err(ModelValidationError::CommissionOutOfRange(101))
        );
        assert!(matches!(
            check_commission(Some(-1)),
            Err(ModelValidationError::NegativeAmount { .. })
        ));
    }
}
