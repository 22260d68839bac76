//! Password hashing for imported accounts.
//!
//! Passwords are stored as Argon2id PHC strings (`$argon2id$v=19$...`), which
//! embed their own salt and parameters.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use serde_json::json;

use crate::error::AppError;

/// Random bytes used for each salt.
const SALT_LENGTH_BYTES: usize = 16;

/// Hashes a plain-text password with a fresh random salt.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system RNG or the hasher fails.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let mut salt_bytes = [0u8; SALT_LENGTH_BYTES];
    getrandom::fill(&mut salt_bytes).map_err(|e| {
        AppError::internal("Failed to generate salt", json!({ "reason": e.to_string() }))
    })?;

    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
        AppError::internal("Failed to encode salt", json!({ "reason": e.to_string() }))
    })?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            AppError::internal("Failed to hash password", json!({ "reason": e.to_string() }))
        })
}
