//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs deserialize from either JSON or form-encoded bodies (see
//! [`crate::api::extract::RequestData`]) and use validator for field rules.

pub mod envelope;
pub mod health;
pub mod import_category;
pub mod import_user;
