//! Field-level validation shared by the entity drafts.

use serde_json::json;

use super::Error;
use super::keys::KeyValidationError;

/// A single rejected input field.
///
/// `field` uses the client-facing (camelCase) name so adapters can report it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    field: &'static str,
    code: &'static str,
    message: String,
}

impl FieldError {
    /// Describe a rejected field.
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }

    /// Rejected field name.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Machine-readable reason.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Wrap a key validation failure for `field`.
    pub fn from_key(field: &'static str, error: &KeyValidationError) -> Self {
        let code = match error {
            KeyValidationError::Empty { .. } => "empty_id",
            KeyValidationError::TooLong { .. } => "id_too_long",
        };
        Self::new(field, code, error.to_string())
    }
}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        Error::invalid_request(value.message)
            .with_details(json!({ "field": value.field, "code": value.code }))
    }
}

/// Trim optional free text; blank input becomes `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<String>,
    max_len: Option<usize>,
) -> Result<Option<String>, FieldError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Some(max) = max_len.filter(|max| trimmed.chars().count() > *max) {
        return Err(FieldError::new(
            field,
            "too_long",
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(Some(trimmed.to_owned()))
}

/// Accept a monetary amount that is finite and not negative.
pub(crate) fn non_negative_amount(
    field: &'static str,
    value: Option<f64>,
) -> Result<Option<f64>, FieldError> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(FieldError::new(
            field,
            "negative_amount",
            format!("{field} must be a non-negative number"),
        )),
        other => Ok(other),
    }
}

/// Accept a stock level that is not negative.
pub(crate) fn non_negative_count(
    field: &'static str,
    value: Option<i32>,
) -> Result<Option<i32>, FieldError> {
    match value {
        Some(count) if count < 0 => Err(FieldError::new(
            field,
            "negative_quantity",
            format!("{field} must not be negative"),
        )),
        other => Ok(other),
    }
}

/// Accept a strictly positive quantity.
pub(crate) fn positive_count(field: &'static str, value: i32) -> Result<i32, FieldError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(FieldError::new(
            field,
            "non_positive_quantity",
            format!("{field} must be greater than zero"),
        ))
    }
}
