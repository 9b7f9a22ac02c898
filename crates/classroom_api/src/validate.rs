//! Request-shape validation run before any core call.
//!
//! Only the first failure is reported.

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Unwraps a JSON body, turning every rejection into a 400.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(ApiError::BadRequest(
            "request body must be JSON".to_string(),
        )),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

/// Returns whether `value` has the shape `local@domain.tld`.
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Requires a present, non-empty, email-shaped field.
pub fn required_email(field: &str, value: Option<String>) -> Result<String, ApiError> {
    let value = required_text(field, value)?;
    if !is_email(&value) {
        return Err(ApiError::BadRequest(format!("{field} must be a valid email")));
    }
    Ok(value)
}

/// Requires a present, non-empty list of email-shaped values.
pub fn required_email_list(field: &str, values: Option<Vec<String>>) -> Result<Vec<String>, ApiError> {
    let values = values.unwrap_or_default();
    if values.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "{field} must contain at least one email"
        )));
    }
    for (index, value) in values.iter().enumerate() {
        if !is_email(value) {
            return Err(ApiError::BadRequest(format!(
                "{field}[{index}] must be a valid email"
            )));
        }
    }
    Ok(values)
}

/// Requires a present, non-empty string field.
pub fn required_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}
