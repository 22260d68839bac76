//! Request payload extraction shared by the import handlers.

use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;

/// Payload decoded from a JSON body, a form-encoded body or, for requests
/// without a body content type, the query string.
///
/// Rejections are [`AppError::Validation`] so handlers can answer them with
/// their own status code.
#[derive(Debug)]
pub struct RequestData<T>(pub T);

impl<S, T> FromRequest<S> for RequestData<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| malformed(e.body_text()))?;
            return Ok(Self(value));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| malformed(e.body_text()))?;
            return Ok(Self(value));
        }

        let Query(value) = Query::<T>::try_from_uri(req.uri()).map_err(|e| malformed(e.body_text()))?;
        Ok(Self(value))
    }
}

fn malformed(reason: String) -> AppError {
    AppError::bad_request("Malformed request body", json!({ "reason": reason }))
}
