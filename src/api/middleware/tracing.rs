//! Request spans for the import API.
//!
//! Spans record the path without its query string, since signed requests
//! carry OAuth parameters there, and name the credential scheme without
//! its value.

use axum::http::{HeaderMap, Request, header::AUTHORIZATION};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Builds one `request` span per call.
///
/// ```text
/// INFO request{method=POST path=/api/v1/import-category auth=oauth}: finished processing request latency=12 ms status=201
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportSpan;

impl<B> MakeSpan<B> for ImportSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            auth = auth_scheme(request.headers()),
        )
    }
}

/// Names the scheme of the `Authorization` header: `bearer`, `oauth` or `none`.
fn auth_scheme(headers: &HeaderMap) -> &'static str {
    let scheme = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().next())
        .unwrap_or_default();

    if scheme.eq_ignore_ascii_case("bearer") {
        "bearer"
    } else if scheme.eq_ignore_ascii_case("oauth") {
        "oauth"
    } else if scheme.is_empty() {
        "none"
    } else {
        "other"
    }
}

/// Tracing layer wrapped around the whole router. 5xx answers are logged as
/// failures at `ERROR`.
pub fn layer()
-> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, ImportSpan, DefaultOnRequest, DefaultOnResponse>
{
    TraceLayer::new_for_http().make_span_with(ImportSpan).on_response(
        DefaultOnResponse::new()
            .level(Level::INFO)
            .latency_unit(LatencyUnit::Millis),
    )
}
