//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use bridge_core::reply::ReplyError;
use bridge_types::error::TransportError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Platform transport failure during an outbound operation.
    Transport(TransportError),
    /// Reply dispatch failure.
    Reply(ReplyError),
    /// The requested operation is not configured (e.g. polling without a tenant).
    NotConfigured(String),
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Transport(e)
    }
}

impl From<ReplyError> for AppError {
    fn from(e: ReplyError) -> Self {
        AppError::Reply(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Remote 422s pass through with their structured detail so
            // callers can diagnose malformed identifiers.
            AppError::Transport(TransportError::Http { status: 422, detail })
            | AppError::Reply(ReplyError::Transport(TransportError::Http {
                status: 422,
                detail,
            })) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "REMOTE_VALIDATION_ERROR",
                detail.clone(),
            ),
            AppError::Reply(ReplyError::Validation(e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Transport(e) | AppError::Reply(ReplyError::Transport(e)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
            }
            AppError::NotConfigured(msg) => {
                (StatusCode::BAD_REQUEST, "NOT_CONFIGURED", msg.clone())
            }
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
