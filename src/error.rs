//! Application error type and its conversion into failure envelopes.
//!
//! Every failure leaving a handler is rendered as an [`ApiResponse`] with
//! `status: "failed"`. The HTTP status defaults to [`AppError::status_code`];
//! endpoints that answer business failures with a fixed status (for example
//! `204` on user import) use [`AppError::respond_with`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use validator::ValidationErrors;

use crate::api::dto::envelope::ApiResponse;

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    Unauthorized { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    RegistrationDisabled { message: String, details: Value },
    MethodNotAllowed { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn registration_disabled(message: impl Into<String>, details: Value) -> Self {
        Self::RegistrationDisabled {
            message: message.into(),
            details,
        }
    }
    pub fn method_not_allowed(message: impl Into<String>, details: Value) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Default HTTP status for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::RegistrationDisabled { .. } => StatusCode::FORBIDDEN,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code placed in the failure payload.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::RegistrationDisabled { .. } => "registration_disabled",
            AppError::MethodNotAllowed { .. } => "method_not_allowed",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::Unauthorized { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::RegistrationDisabled { message, .. }
            | AppError::MethodNotAllowed { message, .. }
            | AppError::Internal { message, .. } => message,
        }
    }

    fn into_parts(self) -> (&'static str, String, Value) {
        let code = self.code();
        match self {
            AppError::Validation { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::NotFound { message, details }
            | AppError::Conflict { message, details }
            | AppError::RegistrationDisabled { message, details }
            | AppError::MethodNotAllowed { message, details }
            | AppError::Internal { message, details } => (code, message, details),
        }
    }

    /// Answers this error with an endpoint-specific status.
    ///
    /// Internal errors always keep `500` so infrastructure faults are never
    /// disguised as business failures.
    pub fn respond_with(self, status: StatusCode) -> ApiFailure {
        let status = match self {
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => status,
        };

        ApiFailure {
            status,
            error: self,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}

/// An [`AppError`] bound to the HTTP status it is answered with.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: AppError,
}

impl From<AppError> for ApiFailure {
    fn from(error: AppError) -> Self {
        Self {
            status: error.status_code(),
            error,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (code, message, details) = self.error.into_parts();

        ApiResponse::failed(
            self.status,
            message,
            json!({ "code": code, "details": details }),
        )
        .into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiFailure::from(self).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let fields: serde_json::Map<String, Value> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), json!(messages))
            })
            .collect();

        AppError::bad_request("Validation did not pass", json!({ "fields": fields }))
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": db.constraint() }),
        );
    }

    tracing::error!(error = %e, "Database error");
    AppError::internal("Database error", json!({}))
}
