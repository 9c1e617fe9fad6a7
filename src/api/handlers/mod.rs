pub mod health;
pub mod todos;
pub mod users;

// common functions for the handlers
use axum::{extract::rejection::JsonRejection, Json};
use regex::Regex;
use tracing::debug;

use crate::api::error::ApiError;

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

/// Unwrap a JSON body, turning any parse failure into `422`.
///
/// # Errors
/// Returns `UnprocessableEntity` when the body is missing, not JSON or mistyped.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejected request body");
            Err(ApiError::unprocessable("invalid JSON body request"))
        }
    }
}

/// `field` must not be empty.
///
/// # Errors
/// Returns `BadRequest` naming the field.
pub fn required(value: &str, field: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{field} can't be empty")));
    }
    Ok(())
}

/// `email` must be present and look like an address.
///
/// # Errors
/// Returns `BadRequest` for an empty or malformed email.
pub fn required_email(email: &str) -> Result<(), ApiError> {
    required(email, "Email")?;
    if !valid_email(email) {
        return Err(ApiError::bad_request("invalid email format"));
    }
    Ok(())
}
