//! 2-legged OAuth 1.0 request verification.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use url::Url;

use crate::domain::entities::Consumer;
use crate::domain::repositories::ConsumerRepository;
use crate::error::AppError;
use crate::utils::oauth_signature::{
    self, SIGNATURE_PARAM, SignatureMethod, parse_authorization_header,
};

pub const MSG_UNSIGNED: &str = "API Requests must be signed.";
pub const MSG_UNKNOWN_CONSUMER: &str = "Unable to verify user for request.";
pub const MSG_WRONG_CONTEXT: &str = "The consumer is not valid in the import API context.";

const CONSUMER_KEY_PARAM: &str = "oauth_consumer_key";
const VERSION_PARAM: &str = "oauth_version";
const METHOD_PARAM: &str = "oauth_signature_method";
const TIMESTAMP_PARAM: &str = "oauth_timestamp";
const NONCE_PARAM: &str = "oauth_nonce";
const TOKEN_PARAM: &str = "oauth_token";

/// The parts of an HTTP request that take part in OAuth signing.
#[derive(Debug, Clone, Default)]
pub struct SignedRequest {
    pub method: String,
    /// Value of the `Host` header.
    pub host: Option<String>,
    pub path: String,
    /// Value of the `Authorization` header when it uses the `OAuth` scheme.
    pub authorization: Option<String>,
    pub query_params: Vec<(String, String)>,
    /// Parameters of an `application/x-www-form-urlencoded` body.
    pub body_params: Vec<(String, String)>,
}

/// Verifies OAuth 1.0 signatures made with a consumer credential and no
/// end-user token.
///
/// Checks run in order and stop at the first failure: presence of a
/// signature, consumer lookup, protocol version, signature method,
/// timestamp and nonce presence, timestamp window, signature, consumer
/// context and finally nonce replay. Only requests that passed every other
/// check record their nonce.
pub struct OAuthService {
    consumers: Arc<dyn ConsumerRepository>,
    context: String,
    timestamp_window: i64,
    public_base_url: Option<Url>,
}

impl OAuthService {
    /// Creates a verifier.
    ///
    /// # Arguments
    ///
    /// - `context` - context a consumer must be registered for
    /// - `timestamp_window` - accepted clock skew in seconds, both directions
    /// - `public_base_url` - scheme and authority used in the signature base
    ///   string; `http://{Host}` when unset
    pub fn new(
        consumers: Arc<dyn ConsumerRepository>,
        context: String,
        timestamp_window: i64,
        public_base_url: Option<Url>,
    ) -> Self {
        Self {
            consumers,
            context,
            timestamp_window,
            public_base_url,
        }
    }

    /// Verifies a request and returns the consumer that signed it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for every verification failure.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn verify_request(&self, request: &SignedRequest) -> Result<Consumer, AppError> {
        let header_params = match request.authorization.as_deref() {
            Some(header) => parse_authorization_header(header)
                .map_err(|e| reject("malformed_header", &e.to_string()))?,
            None => Vec::new(),
        };

        let params: Vec<(String, String)> = header_params
            .into_iter()
            .chain(request.query_params.iter().cloned())
            .chain(request.body_params.iter().cloned())
            .collect();

        let (Some(signature), Some(consumer_key)) = (
            find_param(&params, SIGNATURE_PARAM),
            find_param(&params, CONSUMER_KEY_PARAM),
        ) else {
            return Err(reject("unsigned", MSG_UNSIGNED));
        };

        let consumer = self
            .consumers
            .find_by_key(consumer_key)
            .await?
            .ok_or_else(|| reject("unknown_consumer", MSG_UNKNOWN_CONSUMER))?;

        if let Some(version) = find_param(&params, VERSION_PARAM)
            && version != "1.0"
        {
            return Err(reject("version", "OAuth version not supported"));
        }

        let method: SignatureMethod = find_param(&params, METHOD_PARAM)
            .unwrap_or_default()
            .parse()
            .map_err(|e: oauth_signature::SignatureError| reject("method", &e.to_string()))?;

        let timestamp = find_param(&params, TIMESTAMP_PARAM)
            .and_then(|t| t.parse::<i64>().ok())
            .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
            .ok_or_else(|| reject("timestamp", "Missing or invalid timestamp"))?;

        let nonce = find_param(&params, NONCE_PARAM)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| reject("nonce", "Missing nonce"))?;

        let skew = (Utc::now() - timestamp).num_seconds().abs();
        if skew > self.timestamp_window {
            return Err(reject("timestamp", "Expired timestamp"));
        }

        if find_param(&params, TOKEN_PARAM).is_some_and(|t| !t.is_empty()) {
            return Err(reject("token", "Access tokens are not supported"));
        }

        let base_uri = self.base_uri(request);
        let base = oauth_signature::base_string(&request.method, &base_uri, &params);

        if !oauth_signature::verify(method, &base, &consumer.secret, "", signature) {
            tracing::debug!(base_string = %base, "Signature mismatch");
            return Err(reject("signature", "Invalid signature"));
        }

        if consumer.context != self.context {
            return Err(reject("context", MSG_WRONG_CONTEXT));
        }

        if !self
            .consumers
            .record_nonce(&consumer.consumer_key, nonce, timestamp)
            .await?
        {
            return Err(reject("nonce", "Nonce already used"));
        }

        Ok(consumer)
    }

    /// Base string URI: scheme and authority without default ports, plus
    /// the request path.
    fn base_uri(&self, request: &SignedRequest) -> String {
        let origin = match &self.public_base_url {
            Some(url) => url.origin().ascii_serialization(),
            None => {
                let host = request
                    .host
                    .as_deref()
                    .unwrap_or("localhost")
                    .to_ascii_lowercase();
                format!("http://{}", host.strip_suffix(":80").unwrap_or(&host))
            }
        };

        format!("{}{}", origin, request.path)
    }
}

fn find_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

fn reject(reason: &'static str, message: &str) -> AppError {
    metrics::counter!("import_auth_failures_total", "scheme" => "oauth", "reason" => reason)
        .increment(1);
    AppError::unauthorized(message, json!({ "reason": reason }))
}
