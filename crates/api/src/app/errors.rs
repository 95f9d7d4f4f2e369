//! Response envelope and error mapping.
//!
//! Every response outside `/` and `/health` has the shape
//! `{ "success": bool, "errorCode": int, "value": ... }`, and the HTTP status
//! mirrors `errorCode` (`0` meaning 200).

use std::any::Any;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use x3pl_infra::ServiceError;

pub const INTERNAL_ERROR: &str = "Internal server error";
pub const ROUTE_NOT_FOUND: &str = "Route not found";

pub fn success(value: impl Serialize) -> Response {
    (
        StatusCode::OK,
        axum::Json(json!({
            "success": true,
            "errorCode": 0,
            "value": value,
        })),
    )
        .into_response()
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "errorCode": status.as_u16(),
            "value": { "error": message.into() },
        })),
    )
        .into_response()
}

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Domain(e) => json_error(StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::Internal(detail) => {
            tracing::error!(error = %detail, "request failed with internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> Response {
    json_error(
        StatusCode::BAD_REQUEST,
        format!("Invalid JSON body: {}", rejection.body_text()),
    )
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> Response {
    json_error(
        StatusCode::BAD_REQUEST,
        format!("Invalid query string: {}", rejection.body_text()),
    )
}

pub async fn route_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND)
}

/// Panic handler for `CatchPanicLayer`.
pub fn panic_to_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = %detail, "handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
}
