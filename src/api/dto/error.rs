//! Error response DTOs.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ValidationFieldError;

/// Standard error response format.
///
/// `errors` is present only for request validation failures and maps each
/// failing field to its messages.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "VALIDATION_ERROR",
    "message": "Request validation failed",
    "errors": { "email": ["Enter a valid email address."] }
}))]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
            errors: None,
        }
    }

    pub fn not_found_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new("NOT_FOUND", &format!("{} with {} '{}' not found", entity, field, value))
    }

    pub fn duplicate_error(entity: &str, field: &str, value: &str) -> Self {
        Self::new(
            "DUPLICATE",
            &format!("{} with {} '{}' already exists", entity, field, value),
        )
    }

    /// Single-field validation failure, reported through `errors` as well.
    pub fn validation_error(field: &str, reason: &str) -> Self {
        Self::field_errors(&[ValidationFieldError::new(field, reason)])
    }

    /// Groups per-field messages under `errors`, keeping their order.
    pub fn field_errors(errors: &[ValidationFieldError]) -> Self {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in errors {
            grouped
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }

        Self {
            errors: Some(grouped),
            ..Self::new("VALIDATION_ERROR", "Request validation failed")
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_error_omits_optional_fields() {
        let body = serde_json::to_value(ErrorResponse::new("FORBIDDEN", "nope")).unwrap();
        assert_eq!(body, json!({ "code": "FORBIDDEN", "message": "nope" }));
    }

    #[test]
    fn test_field_errors_are_grouped() {
        let response = ErrorResponse::field_errors(&[
            ValidationFieldError::new("password", "This field is required."),
            ValidationFieldError::new("email", "Enter a valid email address."),
            ValidationFieldError::new("password", "Too short."),
        ]);
        let body = serde_json::to_value(response).unwrap();

        assert_eq!(
            body["errors"],
            json!({
                "email": ["Enter a valid email address."],
                "password": ["This field is required.", "Too short."]
            })
        );
    }

    #[test]
    fn test_with_request_id() {
        let body = serde_json::to_value(ErrorResponse::new("X", "y").with_request_id("abc")).unwrap();
        assert_eq!(body["request_id"], "abc");
    }
}
