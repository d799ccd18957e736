use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use userbase_infra::store::StoreError;

pub const INVALID_USER_ID: &str = "Invalid user ID";
pub const INVALID_REQUEST: &str = "Invalid request";
pub const USER_NOT_FOUND: &str = "User not found";
pub const FIELDS_REQUIRED: &str = "Name and Birthday are required";
pub const INTERNAL_ERROR: &str = "Internal server error";

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

/// Map a store failure to 404 (not found) or 500 (everything else).
///
/// `failure` is the client-facing message for the 500 case; the underlying
/// error is only logged.
pub fn store_error_to_response(err: StoreError, failure: &'static str) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, USER_NOT_FOUND),
        other => {
            tracing::error!(error = %other, "{failure}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    }
}
