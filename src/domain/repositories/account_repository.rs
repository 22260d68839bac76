//! Repository trait for user account data access.

use crate::domain::entities::{Account, NewAccount};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for user accounts.
///
/// Lookups are exact and case-sensitive.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAccountRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Returns true if an account with this e-mail address exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists_by_email(&self, mail: &str) -> Result<bool, AppError>;

    /// Returns true if an account with this user name exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists_by_username(&self, name: &str) -> Result<bool, AppError>;

    /// Creates an account together with its role assignments.
    ///
    /// Role names that are not in the registry are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name or e-mail is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError>;

    /// Finds an account by user name.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_username(&self, name: &str) -> Result<Option<Account>, AppError>;

    /// Finds an account by its database ID, roles included.
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError>;
}
