//! Caller authentication for the import endpoints.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, CONTENT_TYPE, HOST},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::application::services::SignedRequest;
use crate::{error::AppError, state::AppState};

/// Largest request body buffered for signature verification.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Authenticates a request before it reaches an import handler.
///
/// # Authentication Flow
///
/// 1. `Authorization: Bearer <token>`: the caller is a signed-in account.
///    The session is resolved to its [`Account`](crate::domain::entities::Account),
///    which is stored in the request extensions, and OAuth verification is
///    skipped.
/// 2. Otherwise the caller is anonymous and the request must carry a valid
///    2-legged OAuth 1.0 signature. Parameters are read from an
///    `Authorization: OAuth ...` header, the query string and a
///    form-encoded body. The verified
///    [`Consumer`](crate::domain::entities::Consumer) is stored in the request
///    extensions.
///
/// The body is buffered so that form parameters can take part in the
/// signature, then handed on to the handler unchanged.
///
/// # Errors
///
/// Returns `401 Unauthorized` with a failure envelope, logged at error level,
/// if the bearer token is invalid or the OAuth verification fails. The
/// handler is never invoked in that case.
///
/// # Example
///
/// ```rust,ignore
/// let api = import_routes()
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    if has_scheme(&parts.headers, "Bearer") {
        let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
            .await
            .map_err(|_| {
                AppError::unauthorized(
                    "Unauthorized",
                    json!({"reason": "Authorization header is missing or invalid"}),
                )
            })?;

        let account = st
            .auth_service
            .authenticate(&token)
            .await
            .inspect_err(|e| log_failure(&parts, e))?;

        parts.extensions.insert(account);
        return Ok(next.run(Request::from_parts(parts, body)).await);
    }

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            AppError::bad_request("Request body too large", json!({ "reason": e.to_string() }))
        })?;

    let signed = signed_request(&parts, &bytes);

    let consumer = st
        .oauth_service
        .verify_request(&signed)
        .await
        .inspect_err(|e| log_failure(&parts, e))?;

    tracing::debug!(consumer = %consumer.name, "OAuth request verified");
    parts.extensions.insert(consumer);

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn has_scheme(headers: &HeaderMap, scheme: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim_start().get(..scheme.len()))
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

fn signed_request(parts: &Parts, body: &Bytes) -> SignedRequest {
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.path().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let query_params = parts
        .uri
        .query()
        .map(|q| form_params(q.as_bytes()))
        .unwrap_or_default();

    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        });

    let body_params = if is_form {
        form_params(body)
    } else {
        Vec::new()
    };

    let authorization = if has_scheme(&parts.headers, "OAuth") {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    } else {
        None
    };

    SignedRequest {
        method: parts.method.as_str().to_string(),
        host: parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        path,
        authorization,
        query_params,
        body_params,
    }
}

fn form_params(input: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(input).into_owned().collect()
}

fn log_failure(parts: &Parts, error: &AppError) {
    tracing::error!(
        method = %parts.method,
        path = %parts.uri.path(),
        error = %error,
        "Request authentication failed"
    );
}
