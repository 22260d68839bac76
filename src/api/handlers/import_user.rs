//! Handler for user account import.

use axum::{extract::State, http::StatusCode};
use serde_json::json;

use crate::api::dto::envelope::ApiResponse;
use crate::api::dto::import_user::ImportUserRequest;
use crate::api::extract::RequestData;
use crate::error::{ApiFailure, AppError};
use crate::state::AppState;

/// Imports one user account.
///
/// # Endpoint
///
/// `POST /api/v1/import-new-user`
///
/// # Request Body
///
/// JSON or form-encoded:
///
/// ```json
/// {"username": "dave", "email": "dave@example.com", "password": "mypass", "role": "editor"}
/// ```
///
/// # Response Codes
///
/// - **201 Created**: Account created (`User Created`)
/// - **204 No Content**: Registration disabled, missing fields, malformed
///   e-mail or a name/e-mail already in use. HTTP drops the body of a 204, so
///   the message travels in the `X-Api-Message` header.
/// - **401 Unauthorized**: Request not authenticated
/// - **500 Internal Server Error**: Store failure
///
/// Registration mode is checked before the body is decoded, so a disabled
/// site answers the same way whatever the payload.
pub async fn import_user_handler(
    State(state): State<AppState>,
    payload: Result<RequestData<ImportUserRequest>, AppError>,
) -> Result<ApiResponse, ApiFailure> {
    let service = &state.account_service;

    service.ensure_registration_open().map_err(reject)?;

    let RequestData(request) = payload.map_err(reject)?;
    let account = service.import_user(request.into()).await.map_err(reject)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "User Created",
        json!({ "username": account.name, "roles": account.roles }),
    ))
}

fn reject(error: AppError) -> ApiFailure {
    error.respond_with(StatusCode::NO_CONTENT)
}
