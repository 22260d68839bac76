//! Utility functions for request signing, sanitization and hashing.
//!
//! - [`oauth_signature`] - OAuth 1.0 signature base strings and signature methods
//! - [`password`] - Argon2id password hashing
//! - [`sanitize`] - HTML escaping and markup stripping for imported text

pub mod oauth_signature;
pub mod password;
pub mod sanitize;
