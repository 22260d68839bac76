//! Uniform JSON envelope returned by every import endpoint.

use axum::{
    Json,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

/// Header mirroring the envelope `status` field.
pub const API_STATUS_HEADER: HeaderName = HeaderName::from_static("x-api-status");

/// Header mirroring the envelope `message` field.
///
/// HTTP forbids a body on `204 No Content`, so user-import failures would
/// otherwise reach the client without any explanation.
pub const API_MESSAGE_HEADER: HeaderName = HeaderName::from_static("x-api-message");

/// Outcome marker of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Failed,
}

impl ApiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStatus::Success => "success",
            ApiStatus::Failed => "failed",
        }
    }
}

/// Response envelope.
///
/// ```json
/// {
///   "status": "success",
///   "statusCode": 201,
///   "message": "Category created",
///   "payload": { "uuid": "0b7e..." }
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: ApiStatus,
    pub status_code: u16,
    pub message: String,
    pub payload: Value,
}

impl ApiResponse {
    pub fn success(status: StatusCode, message: impl Into<String>, payload: Value) -> Self {
        Self {
            status: ApiStatus::Success,
            status_code: status.as_u16(),
            message: message.into(),
            payload,
        }
    }

    pub fn failed(status: StatusCode, message: impl Into<String>, payload: Value) -> Self {
        Self {
            status: ApiStatus::Failed,
            status_code: status.as_u16(),
            message: message.into(),
            payload,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(&self)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            API_STATUS_HEADER,
            HeaderValue::from_static(self.status.as_str()),
        );
        if let Ok(message) = HeaderValue::from_str(&self.message) {
            headers.insert(API_MESSAGE_HEADER, message);
        }

        response
    }
}
