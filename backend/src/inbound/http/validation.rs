//! Shared validation helpers for inbound HTTP adapters.

use pagination::CursorError;
use serde_json::json;

use crate::domain::{Error, FieldError, KeyValidationError};

/// Map a natural-key rejection for `field` onto the API error shape.
pub(crate) fn key_error(field: &'static str) -> impl Fn(KeyValidationError) -> Error {
    move |error| FieldError::from_key(field, &error).into()
}

/// Reject an undecodable `cursor` query parameter.
pub(crate) fn invalid_cursor_error(error: CursorError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": "cursor",
        "code": "invalid_cursor",
    }))
}

/// Reject a filter value outside its accepted range.
pub(crate) fn out_of_range_error(field: &'static str, message: impl Into<String>) -> Error {
    FieldError::new(field, "out_of_range", message).into()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{CustomerId, ErrorCode};
    use rstest::rstest;

    #[rstest]
    #[case("   ", "empty_id")]
    #[case(&"x".repeat(513), "id_too_long")]
    fn key_errors_report_field_and_code(#[case] raw: &str, #[case] code: &str) {
        let error = CustomerId::new(raw)
            .map_err(key_error("customerId"))
            .expect_err("invalid key");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "customerId", "code": code }))
        );
    }

    #[rstest]
    fn cursor_errors_name_the_cursor_field() {
        let error = invalid_cursor_error(CursorError::Encoding {
            message: "bad byte".to_owned(),
        });
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "cursor", "code": "invalid_cursor" }))
        );
    }
}
