//! Handlers for category import.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::envelope::ApiResponse;
use crate::api::dto::import_category::ImportCategoryRequest;
use crate::api::extract::RequestData;
use crate::application::services::category_service::{
    MSG_CATEGORY_CREATED, MSG_CATEGORY_UPDATED,
};
use crate::domain::entities::CategoryFields;
use crate::error::{ApiFailure, AppError};
use crate::state::AppState;

/// Creates a category.
///
/// # Endpoint
///
/// `POST /api/v1/import-category`
///
/// # Request Body
///
/// ```json
/// {"title": "Gardening", "body": "<p>Plants</p>", "summary": "Plants", "weight": 5, "published": true}
/// ```
///
/// # Response Codes
///
/// - **201 Created**: `Category created`, payload `{"uuid": "..."}`
/// - **400 Bad Request**: `Validation did not pass`
/// - **401 Unauthorized**: Request not authenticated
/// - **500 Internal Server Error**: Store failure
///
/// Repeating the same request creates another category.
pub async fn create_category_handler(
    State(state): State<AppState>,
    payload: Result<RequestData<ImportCategoryRequest>, AppError>,
) -> Result<ApiResponse, ApiFailure> {
    let fields = validated_fields(payload)?;

    let category = state
        .category_service
        .create_category(fields)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        MSG_CATEGORY_CREATED,
        json!({ "uuid": category.uuid }),
    ))
}

/// Updates the category addressed by its UUID.
///
/// # Endpoint
///
/// `PATCH /api/v1/import-category/{uuid}`
///
/// Only non-empty fields are applied; absent or empty fields keep their
/// stored value.
///
/// # Response Codes
///
/// - **200 OK**: `Category updated`, payload `{"uuid": "..."}`
/// - **400 Bad Request**: `Validation did not pass`, or `Did not update
///   category` when the UUID is malformed or does not match exactly one
///   category
/// - **401 Unauthorized**: Request not authenticated
/// - **500 Internal Server Error**: Store failure
pub async fn update_category_handler(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    payload: Result<RequestData<ImportCategoryRequest>, AppError>,
) -> Result<ApiResponse, ApiFailure> {
    let fields = validated_fields(payload)?;

    let category = state
        .category_service
        .update_category(&identifier, fields)
        .await
        .map_err(reject)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        MSG_CATEGORY_UPDATED,
        json!({ "uuid": category.uuid }),
    ))
}

/// `PATCH /api/v1/import-category` without an identifier.
pub async fn missing_identifier_handler() -> ApiFailure {
    reject(AppError::bad_request(
        "Category identifier is required",
        json!({ "field": "uuid" }),
    ))
}

fn validated_fields(
    payload: Result<RequestData<ImportCategoryRequest>, AppError>,
) -> Result<CategoryFields, ApiFailure> {
    let RequestData(request) = payload.map_err(|e| {
        reject(AppError::bad_request(
            "Validation did not pass",
            json!({ "body": e.message() }),
        ))
    })?;

    let request = request.cleaned();
    request.validate().map_err(|e| reject(e.into()))?;

    Ok(request.into_fields())
}

fn reject(error: AppError) -> ApiFailure {
    error.respond_with(StatusCode::BAD_REQUEST)
}
