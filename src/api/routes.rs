//! API route configuration.
//!
//! All import endpoints require an authenticated caller; see
//! [`crate::api::middleware::auth`].

use crate::api::handlers::{
    create_category_handler, import_user_handler, method_not_allowed_handler,
    missing_identifier_handler, update_category_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{patch, post},
};

/// Import routes, mounted under `/api/v1`.
///
/// # Endpoints
///
/// - `POST  /import-new-user`        - Create a user account
/// - `POST  /import-category`        - Create a category
/// - `PATCH /import-category`        - Rejected: identifier required
/// - `PATCH /import-category/{uuid}` - Partially update a category
///
/// Any other method on these paths answers `405 Method Not Allowed`.
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/import-new-user",
            post(import_user_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/import-category",
            post(create_category_handler)
                .patch(missing_identifier_handler)
                .fallback(method_not_allowed_handler),
        )
        .route(
            "/import-category/{uuid}",
            patch(update_category_handler).fallback(method_not_allowed_handler),
        )
}
