use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::scheduling::SchedulingError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str, String),
    Forbidden(&'static str, String),
    BadRequest(&'static str, String),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("INVALID_CREDENTIALS", "Email or password is incorrect".into())
    }

    pub fn session_expired() -> Self {
        ApiError::Unauthorized("SESSION_EXPIRED", "Session expired".into())
    }

    fn to_error_response(code: &str, message: &str) -> Json<Value> {
        Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }))
    }
}

/// Engine failures onto transport errors: validation-class failures are
/// 400, missing resources 404, slot overlap 409, authorization 403.
/// Storage faults stay opaque.
impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        let message = err.to_string();
        match err {
            SchedulingError::MissingField(_)
            | SchedulingError::InvalidTime(_)
            | SchedulingError::InvalidInterval
            | SchedulingError::PastDate
            | SchedulingError::PastStartTime => ApiError::BadRequest("VALIDATION_ERROR", message),
            SchedulingError::InvalidStatus(_) => ApiError::BadRequest("INVALID_STATUS", message),
            SchedulingError::TerminalState(_) => ApiError::BadRequest("TERMINAL_STATE", message),
            SchedulingError::FormulaNotFound => ApiError::NotFound("FORMULA_NOT_FOUND", message),
            SchedulingError::AppointmentNotFound => ApiError::NotFound("NOT_FOUND", message),
            SchedulingError::SlotConflict => ApiError::Conflict("SLOT_CONFLICT", message),
            SchedulingError::Forbidden(_) => ApiError::Forbidden("FORBIDDEN", message),
            SchedulingError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(code, msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Forbidden(code, msg) => {
                (StatusCode::FORBIDDEN, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::BadRequest(code, msg) => {
                (StatusCode::BAD_REQUEST, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::NotFound(code, msg) => {
                (StatusCode::NOT_FOUND, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Conflict(code, msg) => {
                (StatusCode::CONFLICT, ApiError::to_error_response(code, &msg)).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::to_error_response("INTERNAL", &msg),
                )
                    .into_response()
            }
        }
    }
}
