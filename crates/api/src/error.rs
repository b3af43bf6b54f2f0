//! Engine error to HTTP response mapping.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use finledger_core::{EngineError, ErrorKind};
use finledger_shared::AppError;
use serde_json::json;
use tracing::{error, warn};

/// Classifies an engine error into the application taxonomy.
#[must_use]
pub fn to_app_error(e: &EngineError) -> AppError {
    let message = e.to_string();
    match e.kind() {
        ErrorKind::Validation => AppError::Validation(message),
        ErrorKind::InvalidTransition => AppError::InvalidTransition(message),
        ErrorKind::ConcurrencyConflict => AppError::Conflict(message),
        ErrorKind::NotFound => AppError::NotFound(message),
        ErrorKind::Integrity => AppError::Integrity(message),
        ErrorKind::Internal => AppError::Internal(message),
    }
}

/// Seconds a client should wait before repeating a conflicting request.
const RETRY_AFTER_SECS: &str = "1";

/// Renders an engine error as `{"error": <code>, "message": <text>}`.
///
/// The code is the engine's specific code (`OVERPAYMENT`,
/// `INVALID_DATE_RANGE`, ...); the status follows the error kind. Retryable
/// conflicts carry a `Retry-After` header.
pub fn engine_error_response(e: &EngineError) -> Response {
    let app_error = to_app_error(e);
    let status = StatusCode::from_u16(app_error.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match &app_error {
        AppError::Internal(_) => {
            error!(error = %e, code = e.error_code(), "Engine failure");
            return internal_error();
        }
        AppError::Integrity(_) => error!(error = %e, "Blocked write"),
        _ => warn!(error = %e, code = e.error_code(), "Request rejected"),
    }

    let mut response = (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response();
    if app_error.is_retryable() {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
    }
    response
}

/// Opaque 500 response.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "INTERNAL_ERROR",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
