//! Router assembly.
//!
//! `/api/v1/*` import routes sit behind [`auth::layer`]; `/health` is open;
//! any other path gets a logged `404` envelope. Outermost to innermost the
//! production stack is: trailing-slash trimming, rate limiting, request
//! spans, routing.

use crate::api;
use crate::api::handlers::{health_handler, not_found_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Production router. `behind_proxy` switches rate limiting to forwarded
/// client addresses.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    let routes = build_router(state);
    let throttled = if behind_proxy {
        routes.layer(rate_limit::proxied_layer())
    } else {
        routes.layer(rate_limit::layer())
    };

    NormalizePathLayer::trim_trailing_slash().layer(throttled)
}

/// The router without throttling or path trimming. It needs no peer address,
/// so tests serve it directly.
pub fn build_router(state: AppState) -> Router {
    let api_router = api::routes::import_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api_router)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(tracing::layer())
}
