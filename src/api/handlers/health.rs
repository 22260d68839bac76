//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{ComponentCheck, HealthReport};
use crate::state::AppState;

/// Reports whether the service can reach its database.
///
/// # Endpoint
///
/// `GET /health` (no authentication)
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: The role registry could not be read
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": {
///       "status": "ok",
///       "message": "Connected, 4 roles registered"
///     }
///   }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = HealthReport::new([("database", check_database(&state).await)]);

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}

/// Reads the role registry, which every import depends on.
async fn check_database(state: &AppState) -> ComponentCheck {
    match state.account_service.list_roles().await {
        Ok(roles) => ComponentCheck::ok(format!("Connected, {} roles registered", roles.len())),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read the role registry");
            ComponentCheck::error(format!("Database error: {}", e))
        }
    }
}
