//! Responses for requests no import handler can serve.

use axum::http::{Method, Uri};
use serde_json::json;

use crate::error::AppError;

pub const MSG_NO_CONTROLLER: &str = "Could not locate controller for endpoint.";

/// Answers requests whose path matches no route.
///
/// Returns **404 Not Found** with a failure envelope. The miss is logged at
/// error level since clients are expected to call known endpoints only.
pub async fn not_found_handler(method: Method, uri: Uri) -> AppError {
    tracing::error!(%method, path = %uri.path(), "{}", MSG_NO_CONTROLLER);

    AppError::not_found(
        MSG_NO_CONTROLLER,
        json!({ "method": method.as_str(), "path": uri.path() }),
    )
}

/// Answers requests whose path is known but whose method is not.
///
/// Returns **405 Method Not Allowed** with a failure envelope.
pub async fn method_not_allowed_handler(method: Method, uri: Uri) -> AppError {
    tracing::warn!(%method, path = %uri.path(), "Method not allowed");

    AppError::method_not_allowed(
        "Method not allowed",
        json!({ "method": method.as_str() }),
    )
}
