//! Field-level validation primitives
//!
//! Every predicate takes the name of the field it checks so failures read
//! the same way across all commands: `"<field>: <reason>"`.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Why a field failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    Required,
    NilUuid,
    TooLong { max: usize },
    OutOfRange { min: i64, max: i64 },
    Negative,
    NotPositive,
    InPast,
    Invalid(String),
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::NilUuid => write!(f, "must be a non-nil UUID"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
            Self::OutOfRange { min, max } => write!(f, "must be between {min} and {max}"),
            Self::Negative => write!(f, "must not be negative"),
            Self::NotPositive => write!(f, "must be positive"),
            Self::InPast => write!(f, "must be in the future"),
            Self::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

/// Uniform field validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    /// Free-form failure for rules that have no dedicated reason
    pub fn invalid(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(field, ValidationReason::Invalid(msg.into()))
    }
}

/// Result of a single validation predicate
pub type ValidationResult = Result<(), ValidationError>;

/// The value must contain something other than whitespace
pub fn required(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, ValidationReason::Required));
    }
    Ok(())
}

/// The UUID must not be nil
pub fn uuid_non_zero(field: &str, value: impl Into<Uuid>) -> ValidationResult {
    if value.into().is_nil() {
        return Err(ValidationError::new(field, ValidationReason::NilUuid));
    }
    Ok(())
}

/// At most `max` characters (not bytes)
pub fn max_length(field: &str, value: &str, max: usize) -> ValidationResult {
    if value.chars().count() > max {
        return Err(ValidationError::new(field, ValidationReason::TooLong { max }));
    }
    Ok(())
}

/// Inclusive range check
pub fn range(field: &str, value: i64, min: i64, max: i64) -> ValidationResult {
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            ValidationReason::OutOfRange { min, max },
        ));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: i64) -> ValidationResult {
    if value < 0 {
        return Err(ValidationError::new(field, ValidationReason::Negative));
    }
    Ok(())
}

pub fn positive(field: &str, value: i64) -> ValidationResult {
    if value <= 0 {
        return Err(ValidationError::new(field, ValidationReason::NotPositive));
    }
    Ok(())
}

/// The instant must be strictly after `now`
pub fn date_not_past(field: &str, value: DateTime<Utc>, now: DateTime<Utc>) -> ValidationResult {
    if value <= now {
        return Err(ValidationError::new(field, ValidationReason::InPast));
    }
    Ok(())
}
