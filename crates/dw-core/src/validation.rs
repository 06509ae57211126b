//! Validation error types and field checks for request input.

use std::fmt;

use regex::Regex;
use thiserror::Error;

/// The kind of validation error that occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// Input was empty when a value was required.
    Empty,
    /// Input exceeded maximum allowed length.
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length of input.
        actual: usize,
    },
    /// Input was shorter than the minimum length.
    TooShort {
        /// Minimum required length.
        min: usize,
        /// Actual length of input.
        actual: usize,
    },
    /// Input did not match expected format.
    InvalidFormat {
        /// Expected format description.
        expected: String,
        /// What was actually provided.
        actual: String,
    },
    /// Numeric value was below the allowed minimum.
    BelowMinimum {
        /// Minimum allowed value.
        min: f64,
        /// Actual value provided.
        actual: f64,
    },
    /// The same value appeared more than once.
    Duplicate {
        /// The repeated value.
        value: String,
    },
    /// Signature threshold does not fit the signer set.
    InvalidThreshold {
        /// Requested threshold.
        threshold: u32,
        /// Number of signers on the wallet.
        signers: usize,
    },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "input cannot be empty"),
            Self::TooLong { max, actual } => {
                write!(f, "input too long: {actual} chars exceeds max of {max}")
            }
            Self::TooShort { min, actual } => {
                write!(f, "input too short: {actual} chars is below min of {min}")
            }
            Self::InvalidFormat { expected, actual } => {
                write!(f, "invalid format: expected {expected}, got '{actual}'")
            }
            Self::BelowMinimum { min, actual } => {
                write!(f, "value {actual} is below the minimum of {min}")
            }
            Self::Duplicate { value } => write!(f, "duplicate value '{value}'"),
            Self::InvalidThreshold { threshold, signers } => {
                write!(f, "threshold {threshold} must be between 1 and {signers}")
            }
        }
    }
}

/// Error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed for '{field}': {kind}")]
pub struct ValidationError {
    /// The name of the field that failed validation.
    pub field: String,
    /// The kind of validation error.
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Create an "empty" validation error.
    #[must_use]
    pub fn empty(field: impl Into<String>) -> Self {
        Self::new(field, ValidationErrorKind::Empty)
    }

    /// Create a "too long" validation error.
    #[must_use]
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        Self::new(field, ValidationErrorKind::TooLong { max, actual })
    }

    /// Create a "too short" validation error.
    #[must_use]
    pub fn too_short(field: impl Into<String>, min: usize, actual: usize) -> Self {
        Self::new(field, ValidationErrorKind::TooShort { min, actual })
    }

    /// Create an "invalid format" validation error.
    #[must_use]
    pub fn invalid_format(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::new(
            field,
            ValidationErrorKind::InvalidFormat {
                expected: expected.into(),
                actual: actual.into(),
            },
        )
    }

    /// Create a "below minimum" validation error.
    #[must_use]
    pub fn below_minimum(field: impl Into<String>, min: f64, actual: f64) -> Self {
        Self::new(field, ValidationErrorKind::BelowMinimum { min, actual })
    }

    /// Create a "duplicate" validation error.
    #[must_use]
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::Duplicate {
                value: value.into(),
            },
        )
    }

    /// Create an "invalid threshold" validation error.
    #[must_use]
    pub fn invalid_threshold(threshold: u32, signers: usize) -> Self {
        Self::new(
            "threshold",
            ValidationErrorKind::InvalidThreshold { threshold, signers },
        )
    }
}

/// Trim `value` and reject it when nothing is left.
pub fn require_non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty(field));
    }
    Ok(trimmed)
}

/// Reject values longer than `max` characters.
pub fn require_max_len(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::too_long(field, max, len));
    }
    Ok(())
}

/// Reject values shorter than `min` characters.
pub fn require_min_len(field: &str, value: &str, min: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::too_short(field, min, len));
    }
    Ok(())
}

/// Reject amounts below `min`. NaN and infinities never pass.
pub fn require_min(field: &str, value: f64, min: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min {
        return Err(ValidationError::below_minimum(field, min, value));
    }
    Ok(())
}

/// Reject values that do not match `pattern`.
pub fn require_pattern(
    field: &str,
    value: &str,
    pattern: &Regex,
    expected: &str,
) -> Result<(), ValidationError> {
    if !pattern.is_match(value) {
        return Err(ValidationError::invalid_format(field, expected, value));
    }
    Ok(())
}
