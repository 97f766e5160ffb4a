//! Field validation rules shared by every command and event builder.
//!
//! Each rule takes a raw JSON field (`None` when the field is absent) and
//! either returns the normalized value or a [`ValidationError`] naming the
//! offending field. The `validate_*` variants apply the same rules to values
//! that are already typed.

use serde_json::Value;
use thiserror::Error;

/// Minimum length, after trimming, of identifier and timestamp fields.
pub const MIN_TEXT_LEN: usize = 4;

/// Smallest unit count a restock may carry.
pub const MIN_UNITS: i64 = 1;

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid field `{field}`: {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `eventData.sku`).
    pub field: String,

    /// Why the value was rejected.
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Creates a new validation error for a field.
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    /// The field was not present at all.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ValidationReason::Missing)
    }

    /// The value could not be decoded or has the wrong shape.
    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, ValidationReason::Malformed(message.into()))
    }
}

/// The rule a value broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationReason {
    #[error("value is missing")]
    Missing,

    #[error("value is null")]
    Null,

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("must be at least {min} characters after trimming")]
    TooShort { min: usize },

    #[error("must be an integer")]
    NotInteger,

    #[error("must be at least {min}")]
    BelowMinimum { min: i64 },

    #[error("must be at most {max}")]
    AboveMaximum { max: i64 },

    #[error("expected `{expected}`")]
    UnexpectedValue { expected: &'static str },

    #[error("{0}")]
    Malformed(String),
}

/// Validates an identifier field (`sku`, `lotId`): a string of at least
/// [`MIN_TEXT_LEN`] characters once trimmed. Returns the trimmed value.
pub fn identifier(field: &str, raw: Option<&Value>) -> Result<String, ValidationError> {
    let value = string_field(field, raw)?;
    validate_identifier(field, value)
}

/// Validates a timestamp field. The format is not constrained beyond the
/// minimum trimmed length; callers supply ISO-8601.
pub fn timestamp(field: &str, raw: Option<&Value>) -> Result<String, ValidationError> {
    let value = string_field(field, raw)?;
    validate_timestamp(field, value)
}

/// Validates a unit count: a finite JSON integer of at least [`MIN_UNITS`].
///
/// Numbers with a zero fractional part (`12.0`) are accepted as integers.
/// Strings, booleans and fractional numbers are rejected.
pub fn units(field: &str, raw: Option<&Value>) -> Result<u32, ValidationError> {
    match raw {
        None => Err(ValidationError::missing(field)),
        Some(Value::Null) => Err(ValidationError::new(field, ValidationReason::Null)),
        Some(Value::Number(number)) => {
            if let Some(value) = number.as_i64() {
                validate_units(field, value)
            } else if number.is_u64() {
                Err(ValidationError::new(
                    field,
                    ValidationReason::AboveMaximum {
                        max: i64::from(u32::MAX),
                    },
                ))
            } else {
                let value = number.as_f64().unwrap_or(f64::NAN);
                if !value.is_finite() || value.fract() != 0.0 {
                    return Err(ValidationError::new(field, ValidationReason::NotInteger));
                }
                if value > i64::from(u32::MAX) as f64 {
                    return Err(ValidationError::new(
                        field,
                        ValidationReason::AboveMaximum {
                            max: i64::from(u32::MAX),
                        },
                    ));
                }
                validate_units(field, value as i64)
            }
        }
        Some(other) => Err(ValidationError::new(
            field,
            ValidationReason::WrongType {
                expected: "integer",
                found: json_kind(other),
            },
        )),
    }
}

/// Checks that a field holds exactly the expected string literal.
pub fn literal(
    field: &str,
    raw: Option<&Value>,
    expected: &'static str,
) -> Result<(), ValidationError> {
    let value = string_field(field, raw)?;
    if value == expected {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            ValidationReason::UnexpectedValue { expected },
        ))
    }
}

/// Returns the JSON object stored in a field.
pub fn object<'a>(
    field: &str,
    raw: Option<&'a Value>,
) -> Result<&'a serde_json::Map<String, Value>, ValidationError> {
    match raw {
        None => Err(ValidationError::missing(field)),
        Some(Value::Null) => Err(ValidationError::new(field, ValidationReason::Null)),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(ValidationError::new(
            field,
            ValidationReason::WrongType {
                expected: "object",
                found: json_kind(other),
            },
        )),
    }
}

/// Typed form of [`identifier`].
pub fn validate_identifier(field: &str, value: &str) -> Result<String, ValidationError> {
    min_trimmed(field, value)
}

/// Typed form of [`timestamp`].
pub fn validate_timestamp(field: &str, value: &str) -> Result<String, ValidationError> {
    min_trimmed(field, value)
}

/// Typed form of [`units`].
pub fn validate_units(field: &str, value: i64) -> Result<u32, ValidationError> {
    if value < MIN_UNITS {
        return Err(ValidationError::new(
            field,
            ValidationReason::BelowMinimum { min: MIN_UNITS },
        ));
    }
    u32::try_from(value).map_err(|_| {
        ValidationError::new(
            field,
            ValidationReason::AboveMaximum {
                max: i64::from(u32::MAX),
            },
        )
    })
}

fn min_trimmed(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.chars().count() < MIN_TEXT_LEN {
        return Err(ValidationError::new(
            field,
            ValidationReason::TooShort { min: MIN_TEXT_LEN },
        ));
    }
    Ok(trimmed.to_string())
}

fn string_field<'a>(field: &str, raw: Option<&'a Value>) -> Result<&'a str, ValidationError> {
    match raw {
        None => Err(ValidationError::missing(field)),
        Some(Value::Null) => Err(ValidationError::new(field, ValidationReason::Null)),
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(ValidationError::new(
            field,
            ValidationReason::WrongType {
                expected: "string",
                found: json_kind(other),
            },
        )),
    }
}

/// Names the JSON type of a value for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
