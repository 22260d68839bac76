//! Import workflows and caller verification.
//!
//! [`services::AccountService`] and [`services::CategoryService`] carry out
//! imports. [`services::AuthService`] resolves session tokens to accounts and
//! [`services::OAuthService`] verifies signed requests.

pub mod services;
