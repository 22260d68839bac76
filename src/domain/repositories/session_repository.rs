//! Repository trait for account sessions.

use crate::domain::entities::{NewSession, Session};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage for bearer sessions.
///
/// Sessions are looked up by token digest; the raw token never reaches a
/// repository.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSessionRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds the unrevoked session with this token digest.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_active(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    /// Stamps `last_used_at` on a session.
    async fn touch(&self, id: i64) -> Result<(), AppError>;

    /// Issues a session for an account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the token digest is already in use.
    /// Returns [`AppError::Internal`] on database errors, including an
    /// `account_id` that does not exist.
    async fn create(&self, new_session: NewSession) -> Result<Session, AppError>;

    /// Lists every session, newest first.
    async fn list(&self) -> Result<Vec<Session>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Session>, AppError>;

    /// Revokes a session.
    ///
    /// Returns `false` if the session does not exist or was already revoked.
    async fn revoke(&self, id: i64) -> Result<bool, AppError>;

    /// Revokes every open session of an account and returns how many were closed.
    async fn revoke_for_account(&self, account_id: i64) -> Result<u64, AppError>;
}
