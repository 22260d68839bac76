//! OAuth 1.0 request signing primitives (RFC 5849).
//!
//! Only the pieces needed for 2-legged verification live here: parameter
//! encoding and normalization, the signature base string, and the
//! `HMAC-SHA1`, `HMAC-SHA256` and `PLAINTEXT` signature methods. Consumer
//! lookup, timestamps and nonces are handled by
//! [`crate::application::services::OAuthService`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use std::str::FromStr;
use urlencoding::encode;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Parameter carrying the request signature; never part of the base string.
pub const SIGNATURE_PARAM: &str = "oauth_signature";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Signature method not supported: {0}")]
    UnsupportedMethod(String),
    #[error("Malformed OAuth authorization header")]
    MalformedHeader,
}

/// Supported `oauth_signature_method` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMethod {
    HmacSha1,
    HmacSha256,
    Plaintext,
}

impl SignatureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureMethod::HmacSha1 => "HMAC-SHA1",
            SignatureMethod::HmacSha256 => "HMAC-SHA256",
            SignatureMethod::Plaintext => "PLAINTEXT",
        }
    }
}

impl FromStr for SignatureMethod {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HMAC-SHA1" => Ok(SignatureMethod::HmacSha1),
            "HMAC-SHA256" => Ok(SignatureMethod::HmacSha256),
            "PLAINTEXT" => Ok(SignatureMethod::Plaintext),
            other => Err(SignatureError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Decodes a `%XX`-encoded header component.
fn decode_component(value: &str) -> Result<String, SignatureError> {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .map_err(|_| SignatureError::MalformedHeader)
}

/// Parses an `Authorization: OAuth ...` header value into decoded
/// parameters. The `realm` parameter is dropped.
///
/// # Errors
///
/// Returns [`SignatureError::MalformedHeader`] if the scheme is not `OAuth`
/// a parameter is not of the form `name="value"` or does not decode to
/// UTF-8.
pub fn parse_authorization_header(header: &str) -> Result<Vec<(String, String)>, SignatureError> {
    let header = header.trim();
    let (scheme, rest) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));

    if !scheme.eq_ignore_ascii_case("OAuth") {
        return Err(SignatureError::MalformedHeader);
    }

    let mut params = Vec::new();

    for part in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = part
            .split_once('=')
            .ok_or(SignatureError::MalformedHeader)?;

        let value = value
            .trim()
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .ok_or(SignatureError::MalformedHeader)?;

        let name = decode_component(name.trim())?;
        if name.eq_ignore_ascii_case("realm") {
            continue;
        }

        params.push((name, decode_component(value)?));
    }

    Ok(params)
}

/// Builds the normalized request parameter string (RFC 5849 §3.4.1.3.2).
///
/// `oauth_signature` is excluded; pairs are encoded, then sorted by name and
/// value.
pub fn normalize_parameters(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .filter(|(name, _)| name != SIGNATURE_PARAM)
        .map(|(name, value)| (encode(name).into_owned(), encode(value).into_owned()))
        .collect();

    encoded.sort();

    encoded
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the signature base string (RFC 5849 §3.4.1.1).
pub fn base_string(method: &str, base_uri: &str, params: &[(String, String)]) -> String {
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(base_uri),
        encode(&normalize_parameters(params))
    )
}

/// Signing key: encoded consumer secret and token secret joined by `&`.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!("{}&{}", encode(consumer_secret), encode(token_secret))
}

/// Computes the `oauth_signature` value for a base string.
pub fn sign(
    method: SignatureMethod,
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
) -> String {
    let key = signing_key(consumer_secret, token_secret);

    match method {
        SignatureMethod::HmacSha1 => {
            let mut mac =
                HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
            mac.update(base_string.as_bytes());
            STANDARD.encode(mac.finalize().into_bytes())
        }
        SignatureMethod::HmacSha256 => {
            let mut mac =
                HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
            mac.update(base_string.as_bytes());
            STANDARD.encode(mac.finalize().into_bytes())
        }
        SignatureMethod::Plaintext => key,
    }
}

/// Verifies a received signature in constant time.
pub fn verify(
    method: SignatureMethod,
    base_string: &str,
    consumer_secret: &str,
    token_secret: &str,
    signature: &str,
) -> bool {
    let key = signing_key(consumer_secret, token_secret);

    match method {
        SignatureMethod::HmacSha1 => {
            let Ok(expected) = STANDARD.decode(signature) else {
                return false;
            };
            let Ok(mut mac) = HmacSha1::new_from_slice(key.as_bytes()) else {
                return false;
            };
            mac.update(base_string.as_bytes());
            mac.verify_slice(&expected).is_ok()
        }
        SignatureMethod::HmacSha256 => {
            let Ok(expected) = STANDARD.decode(signature) else {
                return false;
            };
            let Ok(mut mac) = HmacSha256::new_from_slice(key.as_bytes()) else {
                return false;
            };
            mac.update(base_string.as_bytes());
            mac.verify_slice(&expected).is_ok()
        }
        SignatureMethod::Plaintext => constant_time_eq(key.as_bytes(), signature.as_bytes()),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
